//! `ChatApp` rendering split by window region.

pub(in crate::app) mod input;
pub(in crate::app) mod panels;
