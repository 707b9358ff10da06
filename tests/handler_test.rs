// 剪贴板导出处理器的端到端测试
use std::cell::Cell;
use std::rc::Rc;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use image_clipboard_handler::ClipboardError;
use image_clipboard_handler::clipboard::targets::{MIME_URI_LIST, text_targets};
use image_clipboard_handler::clipboard::{
    ClipboardHost, ClipboardOwner, MemoryClipboard, SelectionData, TargetKind,
};
use image_clipboard_handler::image_handler::xmp::{MIME_TYPE_XMP, SerializeOptions, XMP_XML_HEADER};
use image_clipboard_handler::image_handler::{
    ClipboardHandler, ExportConfig, ExportError, HandlerState, ImageSource, Pixbuf, StaticImage,
    XmpDocument, XmpError, XmpPacket,
};

const URI: &str = "file:///tmp/a.png";

/// 元数据副本只有在启用 `xmp` 特性时才会被处理器持有。
const XMP_COPIES: u32 = if cfg!(feature = "xmp") { 1 } else { 0 };

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pixbuf() -> Pixbuf {
    let img = RgbaImage::from_fn(6, 4, |x, y| Rgba([x as u8 * 40, y as u8 * 60, 128, 255]));
    Rc::new(DynamicImage::ImageRgba8(img))
}

/// 统计释放次数的元数据文档。
struct CountingXmp {
    drops: Rc<Cell<u32>>,
    fail: bool,
}

impl XmpDocument for CountingXmp {
    fn serialize(&self, options: SerializeOptions) -> Result<String, XmpError> {
        if self.fail {
            return Err(XmpError::Serialize("broken packet".to_string()));
        }
        assert!(options.omit_packet_wrapper);
        assert!(options.encode_utf8);
        Ok("<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>".to_string())
    }
}

impl Drop for CountingXmp {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// 每次 `xmp_info` 都交出一份新副本的来源。
struct CountingSource {
    pixbuf: Option<Pixbuf>,
    uri: Option<String>,
    drops: Rc<Cell<u32>>,
    fail: bool,
}

impl ImageSource for CountingSource {
    fn pixbuf(&self) -> Option<Pixbuf> {
        self.pixbuf.clone()
    }

    fn uri(&self) -> Option<String> {
        self.uri.clone()
    }

    fn xmp_info(&self) -> Option<Box<dyn XmpDocument>> {
        Some(Box::new(CountingXmp {
            drops: Rc::clone(&self.drops),
            fail: self.fail,
        }))
    }
}

fn target_names(clipboard: &MemoryClipboard) -> Vec<String> {
    clipboard.targets().into_iter().map(|e| e.target).collect()
}

#[test]
fn end_to_end_pixbuf_and_uri() {
    init_logger();
    let pb = pixbuf();
    let image = StaticImage::new().with_pixbuf(Rc::clone(&pb)).with_uri(URI);
    let clipboard = MemoryClipboard::new();

    ClipboardHandler::new(&image)
        .copy_to_clipboard(&clipboard)
        .expect("claim should succeed");

    // 来源、处理器各持有一份
    assert_eq!(Rc::strong_count(&pb), 3);

    let names = target_names(&clipboard);
    let config = ExportConfig::default();
    let mut expected: Vec<String> = config.image_mime_types.clone();
    expected.extend(text_targets().iter().map(|t| t.to_string()));
    expected.push(MIME_URI_LIST.to_string());
    assert_eq!(names, expected);

    assert_eq!(clipboard.request_text().as_deref(), Some(URI));
    assert_eq!(clipboard.request_uris(), Some(vec![URI.to_string()]));

    let png = clipboard
        .request_bytes("image/png", &config)
        .expect("encode should succeed")
        .expect("png payload");
    assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(decoded.to_rgba8(), pb.to_rgba8());

    clipboard.clear();

    assert!(!clipboard.has_owner());
    assert!(clipboard.request_text().is_none());
    assert!(clipboard.request_uris().is_none());
    assert!(clipboard.request("image/png").is_none());
    assert_eq!(Rc::strong_count(&pb), 2);
}

#[test]
fn uri_only_registers_text_and_uri_list() {
    init_logger();
    let image = StaticImage::new().with_uri(URI);
    let clipboard = MemoryClipboard::new();
    ClipboardHandler::new(&image).copy_to_clipboard(&clipboard).unwrap();

    let entries = clipboard.targets();
    assert!(entries.iter().all(|e| e.info != TargetKind::Pixbuf.info()));
    assert!(entries.iter().all(|e| !e.target.starts_with("image/")));
    assert_eq!(entries.len(), text_targets().len() + 1);
    assert!(entries.iter().any(|e| e.target == MIME_URI_LIST));

    let text = clipboard
        .request_bytes("text/plain;charset=utf-8", &ExportConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(&text[..], URI.as_bytes());

    let list = clipboard
        .request_bytes(MIME_URI_LIST, &ExportConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(&list[..], format!("{}\r\n", URI).as_bytes());
}

#[test]
fn empty_image_never_becomes_owner() {
    init_logger();
    let clipboard = MemoryClipboard::new();
    let handler = ClipboardHandler::new(&StaticImage::new());

    let result = handler.copy_to_clipboard(&clipboard);

    assert!(matches!(result, Err(ClipboardError::NothingToOffer)));
    assert!(!clipboard.has_owner());
    assert_eq!(handler.state(), HandlerState::Released);
}

#[test]
fn empty_copy_clears_previous_owner() {
    init_logger();
    let clipboard = MemoryClipboard::new();
    let first = ClipboardHandler::new(&StaticImage::new().with_uri(URI));
    first.copy_to_clipboard(&clipboard).unwrap();

    let _ = ClipboardHandler::new(&StaticImage::new()).copy_to_clipboard(&clipboard);

    assert_eq!(first.state(), HandlerState::Released);
    assert!(!clipboard.has_owner());
    assert_eq!(Rc::strong_count(&first), 1);
}

#[test]
fn failed_registration_clears_and_releases() {
    init_logger();
    let pb = pixbuf();
    let clipboard = MemoryClipboard::new();
    let previous = ClipboardHandler::new(&StaticImage::new().with_uri("file:///tmp/old.png"));
    previous.copy_to_clipboard(&clipboard).unwrap();
    clipboard.set_rejecting(true);

    let handler = ClipboardHandler::new(&StaticImage::new().with_pixbuf(Rc::clone(&pb)));
    let result = handler.copy_to_clipboard(&clipboard);

    assert!(matches!(result, Err(ClipboardError::Registration(_))));
    assert_eq!(handler.state(), HandlerState::Released);
    assert_eq!(previous.state(), HandlerState::Released);
    assert!(!clipboard.has_owner());
    // 宿主没有保留任何引用
    assert_eq!(Rc::strong_count(&handler), 1);

    drop(handler);
    assert_eq!(Rc::strong_count(&pb), 1);
}

#[test]
fn replaced_owner_releases_resources_once() {
    init_logger();
    let pb = pixbuf();
    let drops = Rc::new(Cell::new(0));
    let source = CountingSource {
        pixbuf: Some(Rc::clone(&pb)),
        uri: Some(URI.to_string()),
        drops: Rc::clone(&drops),
        fail: false,
    };
    let clipboard = MemoryClipboard::new();
    let handler = ClipboardHandler::new(&source);
    handler.copy_to_clipboard(&clipboard).unwrap();
    let weak = Rc::downgrade(&handler);
    drop(handler);

    ClipboardHandler::new(&StaticImage::new().with_uri("file:///tmp/b.png"))
        .copy_to_clipboard(&clipboard)
        .unwrap();

    assert!(weak.upgrade().is_none());
    assert_eq!(drops.get(), XMP_COPIES);
    assert_eq!(Rc::strong_count(&pb), 2);
    assert_eq!(clipboard.request_text().as_deref(), Some("file:///tmp/b.png"));
}

#[test]
fn repeated_ownership_lost_is_harmless() {
    init_logger();
    let pb = pixbuf();
    let drops = Rc::new(Cell::new(0));
    let source = CountingSource {
        pixbuf: Some(Rc::clone(&pb)),
        uri: None,
        drops: Rc::clone(&drops),
        fail: false,
    };
    let clipboard = MemoryClipboard::new();
    let handler = ClipboardHandler::new(&source);
    handler.copy_to_clipboard(&clipboard).unwrap();

    clipboard.clear();
    handler.on_ownership_lost();
    handler.on_ownership_lost();
    clipboard.clear();

    assert_eq!(handler.state(), HandlerState::Released);
    assert_eq!(Rc::strong_count(&handler), 1);
    assert_eq!(drops.get(), 0);

    let mut selection = SelectionData::new("image/png");
    assert!(matches!(
        handler.on_request(&mut selection, TargetKind::Pixbuf.info()),
        Err(ExportError::Released)
    ));

    drop(handler);
    assert_eq!(drops.get(), XMP_COPIES);
    assert_eq!(Rc::strong_count(&pb), 2);
}

#[cfg(feature = "xmp")]
#[test]
fn xmp_target_serves_rdf_document() {
    init_logger();
    let mut packet = XmpPacket::new();
    packet.set_property("http://purl.org/dc/elements/1.1/", "dc", "format", "image/png");
    let image = StaticImage::new().with_uri(URI).with_xmp(packet);
    let clipboard = MemoryClipboard::new();
    ClipboardHandler::new(&image).copy_to_clipboard(&clipboard).unwrap();

    let entry = clipboard
        .targets()
        .into_iter()
        .find(|e| e.target == MIME_TYPE_XMP)
        .expect("xmp target registered");
    assert_eq!(entry.info, TargetKind::Xmp.info());

    let selection = clipboard.request(MIME_TYPE_XMP).expect("xmp payload");
    let (mime, data) = selection.data().expect("raw bytes");
    assert_eq!(mime, "application/rdf+xml");
    assert!(data.starts_with(XMP_XML_HEADER.as_bytes()));

    let body = std::str::from_utf8(&data[XMP_XML_HEADER.len()..]).unwrap();
    assert!(body.starts_with("<x:xmpmeta"));
    assert!(body.contains("<dc:format>image/png</dc:format>"));
    assert!(!body.contains("xpacket"));
}

#[cfg(feature = "xmp")]
#[test]
fn xmp_serialization_failure_offers_nothing() {
    init_logger();
    let drops = Rc::new(Cell::new(0));
    let source = CountingSource {
        pixbuf: None,
        uri: None,
        drops: Rc::clone(&drops),
        fail: true,
    };
    let clipboard = MemoryClipboard::new();
    let handler = ClipboardHandler::new(&source);
    handler.copy_to_clipboard(&clipboard).unwrap();

    let names = target_names(&clipboard);
    assert_eq!(names, vec![MIME_TYPE_XMP.to_string()]);

    let mut selection = SelectionData::new(MIME_TYPE_XMP);
    handler
        .on_request(&mut selection, TargetKind::Xmp.info())
        .expect("failure is not escalated");
    assert!(!selection.is_set());
    assert!(clipboard.request(MIME_TYPE_XMP).is_none());
}

#[cfg(feature = "xmp")]
#[test]
fn control_characters_in_metadata_offer_nothing() {
    init_logger();
    let mut packet = XmpPacket::new();
    packet.set_property("http://purl.org/dc/elements/1.1/", "dc", "title", "a\u{1}b\u{0}c");
    let image = StaticImage::new().with_uri(URI).with_xmp(packet);
    let clipboard = MemoryClipboard::new();
    ClipboardHandler::new(&image).copy_to_clipboard(&clipboard).unwrap();

    assert!(clipboard.targets().iter().any(|e| e.target == MIME_TYPE_XMP));
    assert!(clipboard.request(MIME_TYPE_XMP).is_none());
    assert_eq!(clipboard.request_text().as_deref(), Some(URI));
}

#[cfg(not(feature = "xmp"))]
#[test]
fn metadata_is_ignored_without_feature() {
    let image = StaticImage::new().with_uri(URI).with_xmp(XmpPacket::new());
    let handler = ClipboardHandler::new(&image);
    assert!(!handler.has_xmp());
    assert!(!handler.target_list().contains(MIME_TYPE_XMP));
}

/// 记录所有请求的宿主，用于确认处理器只注册一次。
#[derive(Default)]
struct CountingHost {
    registrations: Cell<u32>,
    clears: Cell<u32>,
    inner: MemoryClipboard,
}

impl ClipboardHost for CountingHost {
    fn set_with_owner(
        &self,
        targets: &[image_clipboard_handler::clipboard::TargetEntry],
        owner: Rc<dyn ClipboardOwner>,
    ) -> Result<(), ClipboardError> {
        self.registrations.set(self.registrations.get() + 1);
        self.inner.set_with_owner(targets, owner)
    }

    fn clear(&self) {
        self.clears.set(self.clears.get() + 1);
        self.inner.clear();
    }
}

#[test]
fn empty_list_skips_registration() {
    init_logger();
    let host = CountingHost::default();
    let _ = ClipboardHandler::new(&StaticImage::new()).copy_to_clipboard(&host);
    assert_eq!(host.registrations.get(), 0);
    assert_eq!(host.clears.get(), 1);

    ClipboardHandler::new(&StaticImage::new().with_uri(URI))
        .copy_to_clipboard(&host)
        .unwrap();
    assert_eq!(host.registrations.get(), 1);
    assert_eq!(host.clears.get(), 1);
}
