//! Browser automation module
//!
//! This module provides live page access through ChromiumOxide: launching
//! or attaching to a browser, navigation, and the `PageSource` impl that
//! lets the extractor read a rendered tab.

pub mod controller;
pub mod navigation;

pub use controller::{BrowserConfig, BrowserController, PageHandle};
pub use navigation::{validate_url, NavigationOptions, PageNavigator};
