//! Shared constants used across subtrack crates.

/// Default base URL of the remote subscription API.
pub const DEFAULT_API_URL: &str = "http://localhost:7878";

/// Number of subscription cards shown per page.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Default client-side timeout for a single remote call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Preference key holding the last visited page.
pub const PREF_CURRENT_PAGE: &str = "currentPage";
/// Preference key holding the search box contents.
pub const PREF_SEARCH_TEXT: &str = "searchText";
/// Preference key holding the selected category id. Absent means "no filter".
pub const PREF_SELECTED_CATEGORY: &str = "selectedCategory";

/// File name of the JSON preference store inside the config directory.
pub const PREFERENCES_FILE_NAME: &str = "view_prefs.json";
