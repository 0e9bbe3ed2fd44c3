//! Email store
//!
//! Holds the paginated email list and the currently selected email.
//!
//! Page 0 replaces the list, later pages are appended with no
//! de-duplication and no re-sort. The list remembers the query that produced
//! it (the first page's request and its page size). A later page is only
//! appended when it belongs to that query and directly follows the cursor;
//! anything else is discarded instead of being mixed in.
//! Dispatch `ResetPagination` before switching query context.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::notify::{Notifier, Slice};
use super::request::{RequestId, RequestSequence, Track};
use super::rejection_message;
use crate::error::ApiError;
use crate::gateway::AssistantApi;
use crate::types::{Email, EmailPage};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationCursor {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_elements: u64,
    pub has_more: bool,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            current_page: 0,
            total_pages: 0,
            total_elements: 0,
            has_more: true,
        }
    }
}

impl PaginationCursor {
    fn from_page(current_page: u32, page: &EmailPage) -> Self {
        Self {
            current_page,
            total_pages: page.total_pages,
            total_elements: page.total_elements,
            has_more: !page.last,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// The query the held list belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListContext {
    /// Request that fetched page 0
    origin: RequestId,
    size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailsState {
    pub emails: Vec<Email>,
    /// A copy of the last fetched email; the list is never touched through it.
    pub selected_email: Option<Email>,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
    pub pagination: PaginationCursor,
    #[serde(skip)]
    context: Option<ListContext>,
    /// Page 0 fetches and refreshes: both replace the list
    #[serde(skip)]
    list_track: Track,
    #[serde(skip)]
    refresh_track: Track,
    #[serde(skip)]
    detail_track: Track,
    /// List and detail requests still holding `loading`
    #[serde(skip)]
    pending_loads: BTreeSet<RequestId>,
}

#[derive(Debug, Clone)]
pub enum EmailsAction {
    FetchPending(RequestId, PageRequest),
    FetchFulfilled(RequestId, PageRequest, EmailPage),
    FetchRejected(RequestId, PageRequest, ApiError),
    FetchByIdPending(RequestId),
    FetchByIdFulfilled(RequestId, Email),
    FetchByIdRejected(RequestId, ApiError),
    RefreshPending(RequestId),
    RefreshFulfilled(RequestId, EmailPage),
    RefreshRejected(RequestId, ApiError),
    ClearError,
    ClearSelectedEmail,
    ResetPagination,
}

impl EmailsState {
    /// Look up a listed email by id
    pub fn email(&self, id: &str) -> Option<&Email> {
        self.emails.iter().find(|e| e.id == id)
    }

    pub fn reduce(&mut self, action: EmailsAction) {
        match action {
            EmailsAction::FetchPending(id, req) => {
                // Later pages keep the list visible while loading more
                if req.page == 0 {
                    self.list_track.begin(id);
                    self.start_load(id);
                }
                self.error = None;
            }
            EmailsAction::FetchFulfilled(id, req, page) => {
                self.finish_load(id);
                if req.page > 0 {
                    self.append_page(id, req, page);
                } else if self.list_track.is_current(id) {
                    self.replace_list(id, req.size, page);
                } else {
                    debug!("Dropping stale first page ({:?})", id);
                }
            }
            EmailsAction::FetchRejected(id, req, err) => {
                self.finish_load(id);
                let relevant = if req.page == 0 {
                    self.list_track.is_current(id)
                } else {
                    self.context.map_or(true, |ctx| id > ctx.origin)
                };
                if relevant {
                    self.error = Some(rejection_message(&err, "Failed to fetch emails"));
                }
            }
            EmailsAction::FetchByIdPending(id) => {
                self.detail_track.begin(id);
                self.start_load(id);
                self.error = None;
            }
            EmailsAction::FetchByIdFulfilled(id, email) => {
                self.finish_load(id);
                if !self.detail_track.is_current(id) {
                    debug!("Dropping stale email detail {:?}", id);
                    return;
                }
                self.selected_email = Some(email);
            }
            EmailsAction::FetchByIdRejected(id, err) => {
                self.finish_load(id);
                if !self.detail_track.is_current(id) {
                    return;
                }
                self.error = Some(rejection_message(&err, "Failed to fetch email"));
            }
            EmailsAction::RefreshPending(id) => {
                self.list_track.begin(id);
                self.refresh_track.begin(id);
                self.refreshing = true;
                self.error = None;
            }
            EmailsAction::RefreshFulfilled(id, page) => {
                if self.refresh_track.is_current(id) {
                    self.refreshing = false;
                }
                if !self.list_track.is_current(id) {
                    debug!("Dropping stale refresh {:?}", id);
                    return;
                }
                self.replace_list(id, DEFAULT_PAGE_SIZE, page);
            }
            EmailsAction::RefreshRejected(id, err) => {
                if self.refresh_track.is_current(id) {
                    self.refreshing = false;
                }
                if self.list_track.is_current(id) {
                    self.error = Some(rejection_message(&err, "Failed to refresh emails"));
                }
            }
            EmailsAction::ClearError => self.error = None,
            EmailsAction::ClearSelectedEmail => self.selected_email = None,
            EmailsAction::ResetPagination => {
                self.emails.clear();
                self.pagination = PaginationCursor::default();
                self.context = None;
                self.list_track.invalidate();
            }
        }
    }

    fn start_load(&mut self, id: RequestId) {
        self.pending_loads.insert(id);
        self.loading = true;
    }

    fn finish_load(&mut self, id: RequestId) {
        self.pending_loads.remove(&id);
        self.loading = !self.pending_loads.is_empty();
    }

    fn replace_list(&mut self, origin: RequestId, size: u32, page: EmailPage) {
        self.context = Some(ListContext { origin, size });
        self.pagination = PaginationCursor::from_page(0, &page);
        self.emails = page.content;
    }

    /// A later page only extends the list it was requested for, and only
    /// as the page right after the cursor.
    fn append_page(&mut self, id: RequestId, req: PageRequest, page: EmailPage) {
        let Some(ctx) = self.context else {
            debug!("Discarding page {}: no first page loaded", req.page);
            return;
        };
        if id < ctx.origin {
            debug!("Discarding page {} requested before the list was replaced", req.page);
            return;
        }
        if req.size != ctx.size {
            warn!(
                "Discarding page {} of size {}: list holds pages of size {}",
                req.page, req.size, ctx.size
            );
            return;
        }
        if req.page != self.pagination.current_page + 1 {
            warn!(
                "Discarding page {}: list is at page {}",
                req.page, self.pagination.current_page
            );
            return;
        }

        self.pagination = PaginationCursor::from_page(req.page, &page);
        self.emails.extend(page.content);
    }
}

pub struct EmailStore {
    state: RwLock<EmailsState>,
    api: Arc<dyn AssistantApi>,
    requests: RequestSequence,
    notifier: Notifier,
}

impl EmailStore {
    pub fn new(api: Arc<dyn AssistantApi>, notifier: Notifier) -> Self {
        Self {
            state: RwLock::new(EmailsState::default()),
            api,
            requests: RequestSequence::default(),
            notifier,
        }
    }

    pub async fn snapshot(&self) -> EmailsState {
        self.state.read().await.clone()
    }

    pub async fn dispatch(&self, action: EmailsAction) {
        self.state.write().await.reduce(action);
        self.notifier.notify(Slice::Emails);
    }

    pub async fn fetch_emails(&self, req: PageRequest) -> Result<EmailPage, ApiError> {
        let id = self.requests.next();
        self.dispatch(EmailsAction::FetchPending(id, req)).await;

        let result = self.api.get_emails(req.page, req.size).await;
        match &result {
            Ok(page) => self.dispatch(EmailsAction::FetchFulfilled(id, req, page.clone())).await,
            Err(e) => self.dispatch(EmailsAction::FetchRejected(id, req, e.clone())).await,
        }
        result
    }

    /// Fetch the page after the cursor, if any
    pub async fn fetch_next_page(&self) -> Option<Result<EmailPage, ApiError>> {
        let (cursor, size) = {
            let state = self.state.read().await;
            (state.pagination, state.context.map_or(DEFAULT_PAGE_SIZE, |ctx| ctx.size))
        };
        if !cursor.has_more || cursor.total_pages == 0 {
            return None;
        }

        let req = PageRequest {
            page: cursor.current_page + 1,
            size,
        };
        Some(self.fetch_emails(req).await)
    }

    pub async fn fetch_email_by_id(&self, email_id: &str) -> Result<Email, ApiError> {
        let id = self.requests.next();
        self.dispatch(EmailsAction::FetchByIdPending(id)).await;

        let result = self.api.get_email_by_id(email_id).await;
        match &result {
            Ok(email) => self.dispatch(EmailsAction::FetchByIdFulfilled(id, email.clone())).await,
            Err(e) => self.dispatch(EmailsAction::FetchByIdRejected(id, e.clone())).await,
        }
        result
    }

    /// Pull-to-refresh: always the first page at the default size
    pub async fn refresh_emails(&self) -> Result<EmailPage, ApiError> {
        let id = self.requests.next();
        self.dispatch(EmailsAction::RefreshPending(id)).await;

        let req = PageRequest::default();
        let result = self.api.get_emails(req.page, req.size).await;
        match &result {
            Ok(page) => self.dispatch(EmailsAction::RefreshFulfilled(id, page.clone())).await,
            Err(e) => self.dispatch(EmailsAction::RefreshRejected(id, e.clone())).await,
        }
        result
    }
}
