//! Create Jira tickets from application data.
//!
//! A [`TicketCreator`] is built from an explicit [`Settings`] value, the
//! [`Source`] the ticket belongs to and the [`TicketRequestContext`] of the
//! caller. [`TicketCreator::create_ticket`] sends exactly one request and
//! returns the new [`IssueKey`]; failures come back as
//! [`RemoteServiceError`] and are never retried.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use ticketbridge_jira::{Settings, Source, TicketCreator, TicketData, TicketRequestContext};
//!
//! let settings = Settings::load(None::<&str>)?;
//! let creator = TicketCreator::new(TicketRequestContext::new("jdoe"), Source::A, &settings)?;
//! let key = creator
//!     .create_ticket(&TicketData::new().with("product_id", 3).with("name", "Widget"))
//!     .await?;
//! println!("created {key}");
//! # Ok(())
//! # }
//! ```

mod agile;
mod context;
mod creator;
mod data;
mod error;
pub mod payload;
mod search;

pub use agile::{Sprint, SprintState, UnknownSprintState};
pub use context::TicketRequestContext;
pub use creator::{TicketCreator, CONTEXT_USER_HEADER};
pub use data::{IssueKey, TicketData};
pub use error::SetupError;
pub use search::{IssueSummary, Reporter, SEARCH_PAGE_SIZE};

pub use ticketbridge_api::retry::RetryConfig;
pub use ticketbridge_api::RemoteServiceError;
pub use ticketbridge_config::{Settings, Source, UnknownSource};
