//! Browser transport over `fetch` via `gloo-net`.
//!
//! Requests always send cookies (`credentials: include`) and are aborted
//! through an `AbortController` when their timeout elapses.

use async_trait::async_trait;
use futures::future::{Either, select};
use gloo_net::http::{Request, RequestBuilder};
use wasm_bindgen::JsValue;
use web_sys::{AbortController, Blob, BlobPropertyBag, RequestCredentials};

use super::transport::{Body, FormData, FormPart, HttpRequest, HttpResponse, Method, Transport, TransportError};

/// `fetch`-backed transport for the browser build.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let controller = AbortController::new().map_err(js_error)?;
        let signal = controller.signal();

        let mut builder = builder_for(request.method, &request.url)
            .credentials(RequestCredentials::Include)
            .abort_signal(Some(&signal));
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let prepared = match request.body {
            Some(Body::Json(text)) => builder.body(text),
            Some(Body::Form(form)) => builder.body(to_form_data(&form)?),
            None => builder.build(),
        }
        .map_err(|e| TransportError::Connection(e.to_string()))?;

        let millis = u32::try_from(request.timeout.as_millis()).unwrap_or(u32::MAX);
        let send = prepared.send();
        let timer = gloo_timers::future::TimeoutFuture::new(millis);
        futures::pin_mut!(send);
        futures::pin_mut!(timer);

        let response = match select(send, timer).await {
            Either::Left((result, _)) => result.map_err(|e| TransportError::Connection(e.to_string()))?,
            Either::Right(((), _)) => {
                controller.abort();
                return Err(TransportError::Timeout);
            }
        };

        let headers = response.headers().entries().collect();
        let body = response.text().await.map_err(|err| TransportError::Connection(err.to_string()))?;
        Ok(HttpResponse { status: response.status(), status_text: response.status_text(), headers, body })
    }
}

fn builder_for(method: Method, url: &str) -> RequestBuilder {
    match method {
        Method::Get => Request::get(url),
        Method::Post => Request::post(url),
        Method::Put => Request::put(url),
        Method::Patch => Request::patch(url),
        Method::Delete => Request::delete(url),
    }
}

fn to_form_data(form: &FormData) -> Result<web_sys::FormData, TransportError> {
    let data = web_sys::FormData::new().map_err(js_error)?;
    for part in &form.parts {
        match part {
            FormPart::Text { name, value } => data.append_with_str(name, value).map_err(js_error)?,
            FormPart::File { name, file_name, mime, bytes } => {
                let chunks = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes.as_slice()));
                let options = BlobPropertyBag::new();
                options.set_type(mime);
                let blob = Blob::new_with_u8_array_sequence_and_options(&chunks, &options).map_err(js_error)?;
                data.append_with_blob_and_filename(name, &blob, file_name).map_err(js_error)?;
            }
        }
    }
    Ok(data)
}

fn js_error(err: JsValue) -> TransportError {
    TransportError::Connection(format!("{err:?}"))
}
