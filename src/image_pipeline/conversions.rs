//! Pipeline conversions module
//!
//! This module contains the orchestration turning an ROI request into a response.

mod roi_processor;


pub use roi_processor::RoiProcessor;
