// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Qualia conversation engine.
//!
//! This crate provides the shared types, the error enum, and the
//! collaborator trait definitions used throughout the workspace. It
//! performs no I/O of its own.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::QualiaError;
pub use types::{ChannelKind, ContactId, MessageId, Stage};

// Re-export all collaborator traits at crate root.
pub use traits::{
    BehaviorSource, ContextSource, ConversationRepository, LanguageModel, ReplyDelivery,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualia_error_has_all_variants() {
        // Verify all 6 error variants exist and can be constructed.
        let _config = QualiaError::Config("test".into());
        let _storage = QualiaError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _delivery = QualiaError::Delivery {
            message: "test".into(),
            source: None,
        };
        let _transport = QualiaError::Transport {
            message: "test".into(),
            source: None,
        };
        let _malformed = QualiaError::MalformedResponse {
            reason: "test".into(),
        };
        let _internal = QualiaError::Internal("test".into());
    }

    #[test]
    fn error_display_includes_detail() {
        let err = QualiaError::malformed("no JSON object found");
        assert!(err.to_string().contains("no JSON object found"));

        let err = QualiaError::transport("connection refused");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Compile-time check that all 5 collaborator traits are accessible
        // through the public API.
        fn _assert_repository<T: ConversationRepository>() {}
        fn _assert_behavior<T: BehaviorSource>() {}
        fn _assert_delivery<T: ReplyDelivery>() {}
        fn _assert_model<T: LanguageModel>() {}
        fn _assert_context<T: ContextSource>() {}
    }
}
