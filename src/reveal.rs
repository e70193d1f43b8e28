//! One-shot fade-in for result cards as they scroll into view.

use std::collections::BTreeSet;

use crate::dom::NodeId;
use crate::error::Result;
use crate::page::Page;

pub(crate) const REVEALED_CLASS: &str = "fade-in-visible";

/// Vertical extent of an element in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LayoutBox {
    pub(crate) top: i64,
    pub(crate) height: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FadeInObserver {
    threshold: f64,
    bottom_margin_px: i64,
    observed: BTreeSet<NodeId>,
}

impl FadeInObserver {
    pub(crate) fn observed_count(&self) -> usize {
        self.observed.len()
    }
}

impl Page {
    pub(crate) fn install_fade_in_observer(&mut self) -> Result<()> {
        if !self.platform.intersection_observer.is_supported() {
            log::debug!("intersection observation unavailable, result cards stay as rendered");
            return Ok(());
        }
        let options = self.config.reveal.clone();
        let observed = self
            .dom
            .query_selector_all(&options.selector)?
            .into_iter()
            .collect::<BTreeSet<_>>();
        log::debug!("observing {} result cards", observed.len());
        self.reveal = Some(FadeInObserver {
            threshold: options.threshold,
            bottom_margin_px: options.bottom_margin_px,
            observed,
        });
        self.update_intersections()
    }

    /// Fraction of the element's height inside the observation root.
    pub(crate) fn visible_ratio(&self, node: NodeId, bottom_margin_px: i64) -> Option<f64> {
        let layout = self.layout.get(&node)?;
        if layout.height <= 0 || !self.dom.is_connected(node) {
            return None;
        }
        let root_top = self.viewport.scroll_y;
        let root_bottom = self.viewport.scroll_y + self.viewport.height + bottom_margin_px;
        let overlap = (layout.top + layout.height).min(root_bottom) - layout.top.max(root_top);
        if overlap <= 0 {
            return None;
        }
        Some(overlap as f64 / layout.height as f64)
    }

    pub(crate) fn update_intersections(&mut self) -> Result<()> {
        let Some(observer) = self.reveal.as_ref() else {
            return Ok(());
        };
        let revealed = observer
            .observed
            .iter()
            .copied()
            .filter(|node| {
                self.visible_ratio(*node, observer.bottom_margin_px)
                    .is_some_and(|ratio| ratio >= observer.threshold)
            })
            .collect::<Vec<_>>();

        for node in revealed {
            self.dom.class_add(node, REVEALED_CLASS)?;
            if let Some(observer) = self.reveal.as_mut() {
                observer.observed.remove(&node);
            }
            log::debug!("revealed {}", self.node_label(node));
        }
        Ok(())
    }

    /// Number of result cards still waiting to be revealed.
    pub fn observed_card_count(&self) -> usize {
        self.reveal
            .as_ref()
            .map(FadeInObserver::observed_count)
            .unwrap_or(0)
    }
}
