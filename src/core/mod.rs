//! Blob format and runtime internals
//!
//! Decoding layers, bottom up: [`bytes`] (bounds-checked reads), [`view`]
//! (the `View` trait and record access), then the field encodings
//! ([`pointer`], [`array`], [`dict`], [`string`], [`enums`], [`file_id`]).
//! [`header`] and [`blob`] validate whole images; [`store`], [`cache`] and
//! [`external`] load and share them across files.

pub mod array;
pub mod blob;
pub mod bytes;
pub mod cache;
pub mod config;
pub mod dict;
pub mod enums;
pub mod error;
pub mod external;
pub mod file_id;
pub mod header;
pub mod pointer;
pub mod store;
pub mod string;
pub mod view;
pub mod writer;
