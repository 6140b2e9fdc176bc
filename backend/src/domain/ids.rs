//! Opaque identifiers and the clock-driven minter that issues them.
//!
//! Identifiers are plain strings such as `user-1` or `gig-1718000000000`.
//! Seed data uses short hand-written ids; ids minted at runtime embed the
//! current Unix time in milliseconds.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validation errors returned by identifier constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValidationError {
    /// The identifier was empty.
    Empty,
    /// The identifier carried leading or trailing whitespace.
    SurroundingWhitespace,
}

impl fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier must not be empty"),
            Self::SurroundingWhitespace => {
                write!(f, "identifier must not have surrounding whitespace")
            }
        }
    }
}

impl std::error::Error for IdValidationError {}

macro_rules! define_opaque_id {
    ($(#[$outer:meta])* $name:ident) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier from borrowed or owned input.
            ///
            /// # Errors
            ///
            /// Returns [`IdValidationError`] when the input is empty or padded
            /// with whitespace.
            pub fn new(id: impl Into<String>) -> Result<Self, IdValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(IdValidationError::Empty);
                }
                if id.trim() != id {
                    return Err(IdValidationError::SurroundingWhitespace);
                }
                Ok(Self(id))
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_opaque_id! {
    /// Stable identifier of a marketplace user.
    UserId
}

define_opaque_id! {
    /// Stable identifier of a gig listing.
    GigId
}

define_opaque_id! {
    /// Stable identifier of a review.
    ReviewId
}

define_opaque_id! {
    /// Identifier of a chat message.
    MessageId
}

impl MessageId {
    /// Position-based id for a message that only exists in a local log.
    pub(crate) fn local(position: usize) -> Self {
        Self(format!("local-{position}"))
    }
}

/// Issues time-based identifiers of the form `{prefix}-{millis}`.
///
/// Two ids minted within the same millisecond (or after the clock steps
/// backwards) never collide: the embedded number is strictly increasing
/// across every id issued by one minter.
pub struct IdMinter {
    clock: Arc<dyn Clock>,
    last: AtomicI64,
}

impl IdMinter {
    /// Build a minter reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(i64::MIN),
        }
    }

    fn next_stamp(&self) -> i64 {
        let now = self.clock.utc().timestamp_millis();
        let mut previous = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = if now > previous {
                now
            } else {
                previous.saturating_add(1)
            };
            match self.last.compare_exchange_weak(
                previous,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => previous = actual,
            }
        }
    }

    fn mint(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_stamp())
    }

    /// Mint a fresh [`UserId`].
    pub fn user_id(&self) -> UserId {
        UserId(self.mint("user"))
    }

    /// Mint a fresh [`GigId`].
    pub fn gig_id(&self) -> GigId {
        GigId(self.mint("gig"))
    }

    /// Mint a fresh [`ReviewId`].
    pub fn review_id(&self) -> ReviewId {
        ReviewId(self.mint("rev"))
    }

    /// Mint a fresh [`MessageId`].
    pub fn message_id(&self) -> MessageId {
        MessageId(self.mint("msg"))
    }
}

impl fmt::Debug for IdMinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdMinter")
            .field("last", &self.last.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
