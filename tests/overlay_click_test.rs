//! Overlay activation tests: the click path fetches the original image,
//! converts it to a data URI, and fails open to the viewer on bad statuses.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use postfit::dom;
use postfit::dom::parse_html;
use postfit::resizer::overlay_clicked;
use postfit::{DomError, Error, HttpFetcher, ImageResizer, ImageViewer};
use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

struct RecordingViewer {
  calls: RefCell<Vec<(String, String)>>,
}

impl RecordingViewer {
  fn new() -> Self {
    Self {
      calls: RefCell::new(Vec::new()),
    }
  }
}

impl ImageViewer for RecordingViewer {
  fn view_image(&self, data: &str, fallback_url: &str) {
    self
      .calls
      .borrow_mut()
      .push((data.to_string(), fallback_url.to_string()));
  }
}

fn serve_once(response: Vec<u8>) -> (String, thread::JoinHandle<()>) {
  let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
  let addr = listener.local_addr().unwrap();
  let handle = thread::spawn(move || {
    if let Some(stream) = listener.incoming().next() {
      let mut stream = stream.unwrap();
      let mut buf = [0u8; 1024];
      let _ = stream.read(&mut buf);
      let _ = stream.write_all(&response);
    }
  });
  (format!("http://{}", addr), handle)
}

fn doc_with_processed_image(src: &str) -> (markup5ever_rcdom::Handle, ImageResizer) {
  let html = format!(
    r#"<html><body><p><img src="{}" width="963" height="400"></p></body></html>"#,
    src
  );
  let doc = parse_html(&html).expect("parse");
  let img = dom::find_first_element(&doc, "img").expect("img");
  let mut resizer = ImageResizer::new();
  resizer.process(&doc, &img).expect("process");
  (doc, resizer)
}

#[test]
fn click_delivers_the_original_as_a_data_uri() {
  let body = b"rawimagebytes";
  let headers = format!(
    "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\n\r\n",
    body.len()
  );
  let mut response = headers.into_bytes();
  response.extend_from_slice(body);
  let (base, server) = serve_once(response);

  let src = format!("{}/photo.png", base);
  let (doc, _resizer) = doc_with_processed_image(&src);

  let fetcher = HttpFetcher::new().with_timeout(Duration::from_secs(5));
  let viewer = RecordingViewer::new();
  overlay_clicked(&doc, "postfit_image_1_overlay", &fetcher, &viewer).expect("click");
  server.join().unwrap();

  let calls = viewer.calls.borrow();
  assert_eq!(calls.len(), 1);
  let expected = format!("data:image/png;base64,{}", BASE64.encode(body));
  assert_eq!(calls[0], (expected, String::new()));
}

#[test]
fn click_on_missing_resource_fails_open_with_the_url() {
  let (base, server) = serve_once(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n".to_vec());
  let src = format!("{}/gone.png", base);
  let (doc, _resizer) = doc_with_processed_image(&src);

  let fetcher = HttpFetcher::new().with_timeout(Duration::from_secs(5));
  let viewer = RecordingViewer::new();
  overlay_clicked(&doc, "postfit_image_1_overlay", &fetcher, &viewer)
    .expect("click must not error on fetch failure");
  server.join().unwrap();

  let calls = viewer.calls.borrow();
  assert_eq!(calls.len(), 1);
  assert_eq!(calls[0], (String::new(), src));
}

#[test]
fn click_fetches_the_unscaled_source() {
  // Scaling rewrites width/height but never src; the click path must see
  // the original URL even after the image was shrunk.
  let (doc, _resizer) = doc_with_processed_image("http://127.0.0.1:9/unreachable.png");
  let img = dom::find_first_element(&doc, "img").expect("img");
  assert_eq!(
    dom::get_attr(&img, "src").as_deref(),
    Some("http://127.0.0.1:9/unreachable.png")
  );

  // Port 9 (discard) refuses connections; the viewer gets the fallback.
  let fetcher = HttpFetcher::new().with_timeout(Duration::from_millis(500));
  let viewer = RecordingViewer::new();
  overlay_clicked(&doc, "postfit_image_1_overlay", &fetcher, &viewer).expect("click");

  let calls = viewer.calls.borrow();
  assert_eq!(
    calls[0],
    (String::new(), "http://127.0.0.1:9/unreachable.png".to_string())
  );
}

#[test]
fn inline_data_sources_skip_the_network() {
  let src = format!("data:image/gif;base64,{}", BASE64.encode(b"gifbytes"));
  let (doc, _resizer) = doc_with_processed_image(&src);

  let fetcher = HttpFetcher::new();
  let viewer = RecordingViewer::new();
  overlay_clicked(&doc, "postfit_image_1_overlay", &fetcher, &viewer).expect("click");

  let calls = viewer.calls.borrow();
  assert_eq!(calls[0], (src, String::new()));
}

#[test]
fn click_on_unknown_overlay_is_an_error() {
  let doc = parse_html("<html><body></body></html>").expect("parse");
  let fetcher = HttpFetcher::new();
  let viewer = RecordingViewer::new();

  match overlay_clicked(&doc, "postfit_image_9_overlay", &fetcher, &viewer) {
    Err(Error::Dom(DomError::ElementNotFound { id })) => assert_eq!(id, "postfit_image_9"),
    other => panic!("expected ElementNotFound, got {other:?}"),
  }
  assert!(viewer.calls.borrow().is_empty());
}
