//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the strongly typed marketplace entities and the
//! client-side services that keep local state convergent with the
//! marketplace. Adapters live in `outbound`; the seams between the two are
//! the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): stable error payload.
//! - User, Gig, Review and their identifiers and value types.
//! - SessionState, FavoritesSynchronizer, BookingFlow, ChatThread:
//!   per-session services over a [`ports::MarketplaceApi`].
//! - AssistantService: assistive text over a [`ports::TextGenerator`].

pub mod assistant;
pub mod booking;
pub mod chat;
pub mod error;
pub mod favorite_set;
pub mod favorites;
pub mod gig;
pub mod gig_filter;
pub mod ids;
pub mod ports;
pub mod review;
pub mod session;
pub mod user;

pub use self::assistant::{AssistantLanguage, AssistantService};
pub use self::booking::{BookingFlow, PaymentReceipt, PaymentStatus};
pub use self::chat::{ChatMessage, ChatSender, ChatThread};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::favorite_set::FavoriteSet;
pub use self::favorites::{FavoritesPhase, FavoritesSynchronizer};
pub use self::gig::{Gig, GigCategory, GigListing, GigValidationError, NewGig, Price};
pub use self::gig_filter::GigFilter;
pub use self::ids::{GigId, IdMinter, IdValidationError, MessageId, ReviewId, UserId};
pub use self::review::{NewReview, Review, ReviewValidationError, StarRating};
pub use self::session::SessionState;
pub use self::user::{
    Profile, ProfileUpdate, Rating, User, UserName, UserRole, UserValidationError,
    WorkerProfile, WorkerProfileUpdate,
};

/// Convenient domain result alias.
pub type DomainResult<T> = Result<T, Error>;
