//! File Commands
//!
//! Browser file access: reading uploads and offering downloads.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

fn js_msg(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

/// Files picked in an `<input type="file">`
pub fn files_from_event(ev: &web_sys::Event) -> Vec<web_sys::File> {
    let Some(input) = ev
        .target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
    else {
        return Vec::new();
    };
    let Some(list) = input.files() else {
        return Vec::new();
    };
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

/// Files dropped on a drop target
pub fn files_from_drop(ev: &web_sys::DragEvent) -> Vec<web_sys::File> {
    let Some(list) = ev.data_transfer().and_then(|dt| dt.files()) else {
        return Vec::new();
    };
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

pub async fn read_file_text(file: &web_sys::File) -> Result<String, String> {
    let value = JsFuture::from(file.text()).await.map_err(js_msg)?;
    value
        .as_string()
        .ok_or_else(|| format!("'{}' is not text", file.name()))
}

/// Read a file as a `data:` URL (images and attachments are stored inline)
pub async fn read_file_data_url(file: &web_sys::File) -> Result<String, String> {
    let reader = web_sys::FileReader::new().map_err(js_msg)?;
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let done = reader.clone();
        let on_load = Closure::once_into_js(move || {
            let result = done.result().unwrap_or(JsValue::NULL);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });
        let on_error = Closure::once_into_js(move || {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("read failed"));
        });
        reader.set_onload(Some(on_load.unchecked_ref()));
        reader.set_onerror(Some(on_error.unchecked_ref()));
    });
    reader.read_as_data_url(file).map_err(js_msg)?;
    let value = JsFuture::from(promise).await.map_err(js_msg)?;
    value
        .as_string()
        .ok_or_else(|| format!("'{}' could not be read", file.name()))
}

/// Offer `content` as a download through a temporary link
pub fn download_text(file_name: &str, mime: &str, content: &str) -> Result<(), String> {
    // BOM so spreadsheet apps pick UTF-8
    let href = format!(
        "data:{};charset=utf-8,%EF%BB%BF{}",
        mime,
        utf8_percent_encode(content, NON_ALPHANUMERIC)
    );
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "no document".to_string())?;
    let anchor = document
        .create_element("a")
        .map_err(js_msg)?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "not an anchor".to_string())?;
    anchor.set_href(&href);
    anchor.set_download(file_name);
    anchor.click();
    Ok(())
}

/// Browser `getTimezoneOffset()` (minutes, UTC minus local)
pub fn timezone_offset_minutes() -> i32 {
    js_sys::Date::new_0().get_timezone_offset() as i32
}
