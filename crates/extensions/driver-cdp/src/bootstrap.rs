//! In-page helper installed before each harvesting pass.
//!
//! The helper keeps a registry of the elements it has reported, so the Rust
//! side can refer to them by number across calls. Elements that have left the
//! document are dropped from the registry on lookup and before every scan; a
//! reattached element gets its old number back. Each installation carries a
//! token; calls made with a stale token (a new document, or a newer pass)
//! report the page as gone instead of touching the wrong elements.

use serde::Serialize;
use serde_json::Value;

/// CSS selectors describing how coupon cards are laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selectors {
    /// Elements scanned for claim verbs.
    pub controls: String,
    /// Ancestor match for the card enclosing a control.
    pub card: String,
    /// Card type that carries a dedicated title element.
    pub title_card: String,
    pub title: String,
    pub close_marker_class: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            controls: "button,a,span,[role='button']".to_string(),
            card: ".andes-card,li,article,section,[data-testid*='coupon'],[class*='coupon']"
                .to_string(),
            title_card: ".andes-card".to_string(),
            title: ".title".to_string(),
            close_marker_class: "andes-modal__close".to_string(),
        }
    }
}

const HELPER: &str = r#"(() => {
  const selectors = __SELECTORS__;
  const token = __TOKEN__;
  const registry = new Map();
  const ids = new WeakMap();
  let nextId = 1;

  const idOf = (el) => {
    let id = ids.get(el);
    if (id === undefined) {
      id = nextId++;
      ids.set(el, id);
    }
    registry.set(id, el);
    return id;
  };
  const get = (id) => {
    const el = registry.get(id);
    if (el && el.isConnected) return el;
    registry.delete(id);
    return null;
  };
  const prune = () => {
    for (const [id, el] of registry) {
      if (!el.isConnected) registry.delete(id);
    }
  };
  const visible = (el) => {
    if (!el) return false;
    const st = window.getComputedStyle(el);
    const r = el.getBoundingClientRect();
    return st.display !== "none" && st.visibility !== "hidden" && r.width > 0 && r.height > 0;
  };
  const textOf = (el) => String((el && (el.innerText || el.textContent)) || "").trim();
  const targetOf = (el) => el.closest("button,a,[role='button']") || el;
  const isDisabled = (el) =>
    (el instanceof HTMLButtonElement && el.disabled) || el.getAttribute("aria-disabled") === "true";

  window.__couponSniper = {
    token,

    scan() {
      prune();
      return Array.from(document.querySelectorAll(selectors.controls)).map((el) => {
        const target = targetOf(el);
        const card = target.closest(selectors.card) || target.parentElement;
        return {
          node: idOf(el),
          text: textOf(el),
          visible: visible(el),
          target: idOf(target),
          targetVisible: visible(target),
          targetDisabled: isDisabled(target),
          cardText: String((card && card.innerText) || target.innerText || ""),
        };
      });
    },

    state(id) {
      const el = get(id);
      return { attached: el !== null, disabled: el !== null && isDisabled(el) };
    },

    card(id) {
      const el = get(id);
      if (!el) return null;
      const card = el.closest(selectors.titleCard) || el.parentElement;
      const titleNode = card ? card.querySelector(selectors.title) : null;
      const visual = titleNode ? titleNode.querySelector(".interpolated-label__container") : null;
      const visualText = visual ? visual.textContent.trim() : "";
      return {
        text: String((card && card.innerText) || el.innerText || ""),
        titleAttr: titleNode ? titleNode.getAttribute("title") : null,
        titleText: visualText || (titleNode ? titleNode.textContent : null),
      };
    },

    scrollBottom() {
      window.scrollTo({ top: document.body.scrollHeight, behavior: "smooth" });
      return true;
    },

    scrollIntoView(id) {
      const el = get(id);
      if (!el) return false;
      el.scrollIntoView({ behavior: "smooth", block: "center" });
      return true;
    },

    gesture(id) {
      const el = get(id);
      if (!el) return false;
      const opts = { bubbles: true, cancelable: true, composed: true, view: window };
      el.dispatchEvent(new PointerEvent("pointerdown", opts));
      el.dispatchEvent(new MouseEvent("mousedown", opts));
      el.dispatchEvent(new PointerEvent("pointerup", opts));
      el.dispatchEvent(new MouseEvent("mouseup", opts));
      el.dispatchEvent(new MouseEvent("click", opts));
      return true;
    },

    click(id) {
      const el = get(id);
      if (!el) return false;
      el.click();
      return true;
    },

    links() {
      return Array.from(document.querySelectorAll("a[href]"))
        .map((a) => a.href)
        .filter(Boolean);
    },

    dismissCandidates() {
      prune();
      return Array.from(document.querySelectorAll("button,span,a"))
        .filter(visible)
        .map((el) => ({
          el,
          text: textOf(el),
          closeMarker: el.classList.contains(selectors.closeMarkerClass),
        }))
        .filter((c) => c.closeMarker || (c.text.length > 0 && c.text.length <= 24))
        .map((c) => ({ node: idOf(c.el), text: c.text, closeMarker: c.closeMarker }));
    },
  };
  return token;
})()"#;

/// Expression installing the helper with `token`.
pub fn install_script(selectors: &Selectors, token: &str) -> String {
    HELPER
        .replace("__SELECTORS__", &json_literal(selectors))
        .replace("__TOKEN__", &json_literal(token))
}

/// Expression calling `method(args)` on the helper installed with `token`.
///
/// Evaluates to `{gone: true}` when that helper is no longer installed,
/// otherwise to `{value: <result>}`.
pub fn call_expression(token: &str, method: &str, args: &[Value]) -> String {
    let args = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "(() => {{ const s = window.__couponSniper; \
         if (!s || s.token !== {token}) return {{ gone: true }}; \
         return {{ value: s.{method}({args}) }}; }})()",
        token = json_literal(token),
    )
}

fn json_literal<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_install_script_embeds_selectors_and_token() {
        let script = install_script(&Selectors::default(), "tok-1");
        assert!(script.contains(r#"const token = "tok-1";"#));
        assert!(script.contains(r#""closeMarkerClass":"andes-modal__close""#));
        assert!(script.contains(r#""titleCard":".andes-card""#));
        assert!(!script.contains("__SELECTORS__"));
        assert!(!script.contains("__TOKEN__"));
    }

    #[test]
    fn test_registry_drops_detached_elements() {
        let script = install_script(&Selectors::default(), "tok-1");
        assert!(script.contains("const prune = () =>"));
        assert!(script.contains("if (!el.isConnected) registry.delete(id);"));
        assert!(script.contains("scan() {\n      prune();"));
        assert!(script.contains("dismissCandidates() {\n      prune();"));
        assert!(script.contains("registry.delete(id);\n    return null;"));
    }

    #[test]
    fn test_selectors_are_escaped() {
        let selectors = Selectors {
            controls: r#"button[data-x="a\"b"]"#.to_string(),
            ..Default::default()
        };
        let script = install_script(&selectors, "t");
        assert!(script.contains(r#"button[data-x=\"a\\\"b\"]"#));
    }

    #[test]
    fn test_call_expression() {
        let expr = call_expression("tok-1", "state", &[json!(7)]);
        assert!(expr.contains(r#"s.token !== "tok-1""#));
        assert!(expr.contains("s.state(7)"));
        assert!(expr.contains("gone: true"));

        let expr = call_expression("tok-1", "scan", &[]);
        assert!(expr.contains("s.scan()"));
    }
}
