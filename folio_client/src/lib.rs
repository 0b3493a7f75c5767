//! Client side of the contact form: local validation, submission and the
//! resulting status shown to the user.

pub mod api;
pub mod form;
