//! Scripted in-memory session for strategy tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use super::{Lookup, RenderSession, SessionLauncher};
use crate::error::ScraperError;

/// Serves canned DOM snapshots. Each `Found` click advances to the next
/// snapshot, or in tabbed mode jumps to the snapshot at the clicked index.
pub(crate) struct ScriptedSession {
    contents: Vec<String>,
    state: usize,
    tabbed: bool,
    clicks: VecDeque<Lookup>,
    waits: VecDeque<Lookup>,
    counts: HashMap<String, usize>,
    clicked: Vec<(String, usize)>,
    fail_content: bool,
    fail_wait_at: Option<usize>,
    fail_click_at: Option<usize>,
    waited: usize,
    closed: Rc<Cell<bool>>,
}

impl ScriptedSession {
    pub(crate) fn new(contents: Vec<String>) -> Self {
        Self {
            contents,
            state: 0,
            tabbed: false,
            clicks: VecDeque::new(),
            waits: VecDeque::new(),
            counts: HashMap::new(),
            clicked: Vec::new(),
            fail_content: false,
            fail_wait_at: None,
            fail_click_at: None,
            waited: 0,
            closed: Rc::new(Cell::new(false)),
        }
    }

    /// Click outcomes in order; once exhausted every click is `NotFound`.
    pub(crate) fn with_clicks(mut self, clicks: impl IntoIterator<Item = Lookup>) -> Self {
        self.clicks = clicks.into_iter().collect();
        self
    }

    /// `wait_for` outcomes in order; once exhausted every wait is `Found`.
    pub(crate) fn with_waits(mut self, waits: impl IntoIterator<Item = Lookup>) -> Self {
        self.waits = waits.into_iter().collect();
        self
    }

    pub(crate) fn with_count(mut self, selector: &str, count: usize) -> Self {
        self.counts.insert(selector.to_string(), count);
        self
    }

    pub(crate) fn tabbed(mut self) -> Self {
        self.tabbed = true;
        self
    }

    pub(crate) fn failing_content(mut self) -> Self {
        self.fail_content = true;
        self
    }

    /// The `call`-th `wait_for` (0-based) fails with a render error.
    pub(crate) fn failing_wait_at(mut self, call: usize) -> Self {
        self.fail_wait_at = Some(call);
        self
    }

    /// The `call`-th click (0-based) fails with a render error.
    pub(crate) fn failing_click_at(mut self, call: usize) -> Self {
        self.fail_click_at = Some(call);
        self
    }

    pub(crate) fn closed_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.closed)
    }

    pub(crate) fn click_count(&self) -> usize {
        self.clicked.len()
    }
}

impl RenderSession for ScriptedSession {
    async fn navigate(&mut self, _url: &str) -> Result<(), ScraperError> {
        Ok(())
    }

    async fn content(&mut self) -> Result<String, ScraperError> {
        if self.fail_content {
            return Err(ScraperError::Render("content unavailable".to_string()));
        }
        let last = self.contents.len().saturating_sub(1);
        Ok(self
            .contents
            .get(self.state.min(last))
            .cloned()
            .unwrap_or_default())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ScraperError> {
        Ok(())
    }

    async fn click(&mut self, selector: &str, index: usize) -> Result<Lookup, ScraperError> {
        self.clicked.push((selector.to_string(), index));
        if self.fail_click_at == Some(self.clicked.len() - 1) {
            return Err(ScraperError::Render("click failed".to_string()));
        }
        let outcome = self.clicks.pop_front().unwrap_or(Lookup::NotFound);
        if outcome == Lookup::Found {
            self.state = if self.tabbed { index } else { self.state + 1 };
        }
        Ok(outcome)
    }

    async fn count(&mut self, selector: &str) -> Result<usize, ScraperError> {
        Ok(self.counts.get(selector).copied().unwrap_or(0))
    }

    async fn wait_for(
        &mut self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<Lookup, ScraperError> {
        let call = self.waited;
        self.waited += 1;
        if self.fail_wait_at == Some(call) {
            return Err(ScraperError::Render("wait failed".to_string()));
        }
        Ok(self.waits.pop_front().unwrap_or(Lookup::Found))
    }

    async fn close(self) {
        self.closed.set(true);
    }
}

/// Hands out one prepared session.
pub(crate) struct ScriptedLauncher {
    session: RefCell<Option<ScriptedSession>>,
}

impl ScriptedLauncher {
    pub(crate) fn new(session: ScriptedSession) -> Self {
        Self {
            session: RefCell::new(Some(session)),
        }
    }
}

impl SessionLauncher for ScriptedLauncher {
    type Session = ScriptedSession;

    async fn launch(&self, _site: &str, _user_agent: &str) -> Result<ScriptedSession, ScraperError> {
        self.session
            .borrow_mut()
            .take()
            .ok_or_else(|| ScraperError::Render("session already launched".to_string()))
    }
}
