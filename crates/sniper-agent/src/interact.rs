//! Interaction simulation.

use tracing::debug;

use sniper_protocols::{NodeRef, PageDriver};

/// Click `node` with a full gesture sequence, falling back to a direct click.
///
/// Returns `false` when both attempts failed; the caller skips the element.
pub async fn click(driver: &dyn PageDriver, node: NodeRef) -> bool {
    let gesture_err = match driver.dispatch_gesture(node).await {
        Ok(()) => return true,
        Err(e) => e,
    };
    debug!(node = node.0, "Gesture dispatch failed ({}), trying direct click", gesture_err);

    match driver.click_direct(node).await {
        Ok(()) => true,
        Err(e) => {
            debug!(node = node.0, "Direct click failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeControl, FakePage};

    fn page() -> FakePage {
        FakePage::new(
            "https://www.mercadolivre.com.br/cupons",
            vec![FakeControl::new(1, "Aplicar", "10% OFF")],
        )
    }

    #[tokio::test]
    async fn test_gesture_click() {
        let page = page();
        assert!(click(&page, NodeRef(1)).await);
        assert_eq!(page.clicks(), vec![1]);
    }

    #[tokio::test]
    async fn test_falls_back_to_direct_click() {
        let page = page();
        page.fail_gesture(1);
        assert!(click(&page, NodeRef(1)).await);
        assert_eq!(page.clicks(), vec![1]);
    }

    #[tokio::test]
    async fn test_both_failing_reports_false() {
        let page = page();
        page.fail_gesture(1);
        page.fail_direct(1);
        assert!(!click(&page, NodeRef(1)).await);
        assert!(page.clicks().is_empty());
    }
}
