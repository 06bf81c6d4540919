//! Shared constants for things
//!

/// Industries offered in the form.
pub const INDUSTRIES: &[&str] = &[
    "Technology",
    "Food & Beverage",
    "Health & Wellness",
    "Finance",
    "Real Estate",
    "Education",
    "Retail & E-commerce",
    "Creative & Design",
    "Travel & Hospitality",
    "Other",
];

/// Styles offered in the form.
pub const STYLES: &[&str] = &[
    "minimalist",
    "modern",
    "vintage",
    "playful",
    "elegant",
    "bold",
    "geometric",
    "hand-drawn",
];

/// Workspaces (and their sessions) idle longer than this are dropped.
pub const WORKSPACE_IDLE_MINUTES: i64 = 60;

/// Length of CSRF tokens and workspace ids
pub const TOKEN_LENGTH: usize = 32;

/// Label of the generate button while idle
pub const GENERATE_LABEL: &str = "Generate Your Free Logo";

/// Label of the generate button while a request is in flight
pub const GENERATING_LABEL: &str = "Generating...";
