//! An implementation of the SRP-6a (Secure Remote Password) protocol with
//! a post-handshake message encryption layer.
//!
//! SRP-6a is a password-authenticated key exchange ("PAKE"): a client
//! proves knowledge of a password to a server that stores only a verifier
//! derived from it, and both parties derive a shared secret without the
//! password or any reversible function of it crossing the wire. An active
//! attacker gets exactly one password guess per protocol run; a passive
//! one learns nothing.
//!
//! # Structure
//!
//! - [`params`] fixes the `(N, g, H)` configuration; the RFC 5054 groups
//!   from 1024 to 8192 bits live in [`groups`], the hash is any
//!   [`digest::Digest`] type. The default is the 2048-bit group with
//!   SHA-512.
//! - [`routines`] exposes the protocol formulas as pure functions.
//! - [`client`] and [`server`] drive the three-message handshake as
//!   typestate machines: each stage is a distinct type, each transition
//!   consumes its stage, so a step can never run twice or out of order.
//! - [`verifier`] creates the registration-time `(salt, verifier)` record.
//! - [`cipher`] turns the shared premaster secret into an authenticated
//!   message channel (a fallback construction, not an AEAD; see the
//!   module docs for its limits).
//!
//! # Example
//!
//! ```ignore
//! use sha2::Sha512;
//! use srp6a::client::SrpClient;
//! use srp6a::params::SrpParameters;
//! use srp6a::routines::SrpRoutines;
//! use srp6a::server::SrpServer;
//! use srp6a::verifier::generate_verifier;
//!
//! let routines = SrpRoutines::<Sha512>::new(SrpParameters::default());
//!
//! // registration
//! let record = generate_verifier(&routines, "alice", "password123", None)?;
//!
//! // authentication
//! let credentials = SrpClient::new(&routines).step1("alice", "password123")?;
//! let mut handshake =
//!     SrpServer::new(&routines).step1("alice", &record.salt, &record.verifier)?;
//! let client = credentials.step2(handshake.salt(), handshake.b_pub())?;
//! let a_pub = client.a_pub().clone();
//! let m2 = handshake.step2(&a_pub, client.proof())?;
//! let session = client.step3(&m2)?;
//!
//! // encrypted application traffic
//! let msg = session.encrypt(b"hello");
//! let plain = handshake.decrypt(&a_pub, &msg.iv, &msg.ciphertext)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod cipher;
pub mod client;
pub mod errors;
pub mod groups;
pub mod params;
pub mod routines;
pub mod server;
pub mod utils;
pub mod verifier;

pub use cipher::{EncryptedMessage, SessionCipher, IV_LENGTH, TAG_LENGTH};
pub use client::SrpClient;
pub use errors::SrpError;
pub use params::SrpParameters;
pub use routines::SrpRoutines;
pub use server::SrpServer;
pub use verifier::{generate_verifier, SrpVerifierSet};
