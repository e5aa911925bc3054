//! Headless smooth-scroll backend
//!
//! Creates instances over a [`SharedDocument`] whose scroll position doubles
//! as the proxy position. Every call is logged to a shared
//! [`SmoothScrollLog`] so callers can inspect what happened after the
//! instance has been handed off as a trait object.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use unveil_platform::{
    NodeId, PlatformError, ScrollTarget, ScrollToOptions, SharedDocument, SmoothScroll,
    SmoothScrollBackend, SmoothScrollConfig,
};

/// Calls observed by the headless backend
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SmoothScrollLog {
    pub created: usize,
    pub container: Option<NodeId>,
    pub config: Option<SmoothScrollConfig>,
    pub updates: usize,
    pub scroll_tos: Vec<(ScrollTarget, ScrollToOptions)>,
    pub destroyed: bool,
}

pub type SharedScrollLog = Rc<RefCell<SmoothScrollLog>>;

/// Factory for [`HeadlessSmoothScroll`] instances
pub struct HeadlessSmoothScrollBackend {
    document: SharedDocument,
    failure: Option<String>,
    log: SharedScrollLog,
}

impl HeadlessSmoothScrollBackend {
    pub fn new(document: SharedDocument) -> Self {
        Self {
            document,
            failure: None,
            log: SharedScrollLog::default(),
        }
    }

    /// Make `create` fail with `message`
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn log(&self) -> SharedScrollLog {
        self.log.clone()
    }
}

impl SmoothScrollBackend for HeadlessSmoothScrollBackend {
    fn create(
        &mut self,
        container: NodeId,
        config: &SmoothScrollConfig,
    ) -> Result<Box<dyn SmoothScroll>, PlatformError> {
        if let Some(message) = &self.failure {
            return Err(PlatformError::InitFailed(message.clone()));
        }
        {
            let mut log = self.log.borrow_mut();
            log.created += 1;
            log.container = Some(container);
            log.config = Some(*config);
        }
        debug!("Headless smooth scroll created over {:?}", container);
        Ok(Box::new(HeadlessSmoothScroll {
            document: self.document.clone(),
            log: self.log.clone(),
        }))
    }
}

/// Smooth-scroll instance that jumps straight to its targets
pub struct HeadlessSmoothScroll {
    document: SharedDocument,
    log: SharedScrollLog,
}

impl SmoothScroll for HeadlessSmoothScroll {
    fn scroll_y(&self) -> f32 {
        self.document.borrow().scroll_y()
    }

    fn scroll_to(&mut self, target: ScrollTarget, options: &ScrollToOptions) {
        self.log.borrow_mut().scroll_tos.push((target, *options));
        let y = match target {
            ScrollTarget::Offset(y) => Some(y),
            ScrollTarget::Node(node) => self
                .document
                .borrow()
                .document_rect(node)
                .map(|rect| rect.top()),
        };
        if let Some(y) = y {
            self.document.borrow_mut().scroll_to(y + options.offset);
        }
    }

    fn update(&mut self) {
        self.log.borrow_mut().updates += 1;
    }

    fn destroy(&mut self) {
        self.log.borrow_mut().destroyed = true;
    }
}
