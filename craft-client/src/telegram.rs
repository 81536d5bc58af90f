//! Telegram Mini-App launch data
//!
//! Telegram hands the signed `initData` to the web app directly, and older
//! clients only put it in the URL fragment as `#tgWebAppData=...`.

use url::Url;

const HASH_PARAM: &str = "tgWebAppData";

/// Signed `initData` from the launch value, else from the page URL fragment
pub fn init_data(launch_value: Option<&str>, page_url: Option<&str>) -> Option<String> {
    if let Some(value) = launch_value.map(str::trim).filter(|v| !v.is_empty()) {
        return Some(value.to_string());
    }
    page_url.and_then(init_data_from_url)
}

/// Extract `tgWebAppData` from a URL's fragment
pub fn init_data_from_url(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    let fragment = url.fragment()?;
    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == HASH_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
