//! Sample data shared by the tests of the other crates.

use std::{
    net::{IpAddr, Ipv4Addr},
    sync::LazyLock,
};

use folio_models::{
    contact::{ContactSubmission, RawContactSubmission},
    email_address::EmailAddress,
};

pub const CLIENT_IP1: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
pub const CLIENT_IP2: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 7));

pub static OWNER_EMAIL: LazyLock<EmailAddress> =
    LazyLock::new(|| "owner@portfolio.example".parse().unwrap());
pub static RECIPIENT_EMAIL: LazyLock<EmailAddress> =
    LazyLock::new(|| "inbox@portfolio.example".parse().unwrap());

pub static AL: LazyLock<RawContactSubmission> = LazyLock::new(|| RawContactSubmission {
    name: "Al".into(),
    email: "al@x.com".into(),
    message: "Hello there!".into(),
});

pub static AL_SUBMISSION: LazyLock<ContactSubmission> =
    LazyLock::new(|| ContactSubmission::parse(&AL).unwrap());

/// Multi line message containing markup that has to be escaped in html emails.
pub static MALLORY: LazyLock<RawContactSubmission> = LazyLock::new(|| RawContactSubmission {
    name: "Mallory <b>".into(),
    email: "mallory@example.org".into(),
    message: "First line\nSecond <script>alert(1)</script> line".into(),
});

pub static MALLORY_SUBMISSION: LazyLock<ContactSubmission> =
    LazyLock::new(|| ContactSubmission::parse(&MALLORY).unwrap());

pub static INVALID_NAME: LazyLock<RawContactSubmission> = LazyLock::new(|| RawContactSubmission {
    name: "A".into(),
    ..AL.clone()
});
