//! End-to-end crop flows through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use image::{Rgba, RgbaImage};
use imgclip_core::encode::encode_png;
use imgclip_core::{
    decode_image, Color, CoverageBounds, CropSession, HideReason, ImageSource, LoadState,
    Options, OutputType, PointerPhase, PointerSample, SaveRequest, SessionEvent, Shape,
};

/// 400x300 image: left half red, right half blue.
fn split_png() -> Vec<u8> {
    let img = RgbaImage::from_fn(400, 300, |x, _| {
        if x < 200 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    encode_png(&img).unwrap()
}

fn collect_events(session: &mut CropSession) -> Rc<RefCell<Vec<SessionEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    session.set_listener(move |event| sink.borrow_mut().push(event.clone()));
    log
}

#[test]
fn square_crop_of_centered_view() {
    let mut session = CropSession::default();
    let log = collect_events(&mut session);

    session.load(ImageSource::Encoded(split_png())).unwrap();
    session.show(100, 100);
    let result = session.save(SaveRequest::default()).unwrap();

    assert_eq!((result.width, result.height), (300, 300));
    let decoded = decode_image(&result.data).unwrap();
    // Source x 50..350: the split lands at output x 150
    assert_eq!(decoded.pixel(149, 10), Some([255, 0, 0, 255]));
    assert_eq!(decoded.pixel(150, 10), Some([0, 0, 255, 255]));

    let names: Vec<_> = log.borrow().iter().map(SessionEvent::name).collect();
    assert_eq!(names, ["loading", "loaded", "show", "saved", "hide"]);
    assert_eq!(
        log.borrow().last(),
        Some(&SessionEvent::Hide(HideReason::Save))
    );
}

#[test]
fn pan_to_left_edge_then_export_circle_jpeg() {
    let options = Options::new()
        .with_shape(Shape::Circle)
        .with_background(Color::WHITE)
        .with_output(OutputType::Jpeg, Some(0.9));
    let mut session = CropSession::new(options);
    session.load(ImageSource::Encoded(split_png())).unwrap();
    session.show(100, 100);

    // Drag far right: the image's left edge meets the region's left edge
    session.pointer(PointerPhase::Down, &[PointerSample::new(1, 10.0, 50.0)]);
    session.pointer(PointerPhase::Move, &[PointerSample::new(1, 90.0, 50.0)]);
    session.pointer(PointerPhase::Up, &[]);
    assert_eq!(session.transform().x, 0.0);

    session.set_target_width(120);
    let result = session.save(SaveRequest::default()).unwrap();
    assert_eq!(result.output_type, OutputType::Jpeg);
    assert_eq!((result.width, result.height), (120, 120));

    let decoded = decode_image(&result.data).unwrap();
    // Corner lies outside the circle: white background
    let [r, g, b, _] = decoded.pixel(0, 0).unwrap();
    assert!(r > 230 && g > 230 && b > 230);
    // Center shows source x 150: red
    let [r, g, b, _] = decoded.pixel(60, 60).unwrap();
    assert!(r > 200 && g < 60 && b < 60);
}

#[test]
fn pinch_and_wheel_preserve_coverage() {
    let mut session = CropSession::new(Options::new().with_ratio(16.0, 9.0));
    session.load(ImageSource::Encoded(split_png())).unwrap();
    session.show(320, 240);
    let bounds = CoverageBounds::new(400, 300, session.region());

    let p = PointerSample::new;
    session.pointer(PointerPhase::Down, &[p(1, 100.0, 120.0), p(2, 140.0, 120.0)]);
    for step in 1..10 {
        let spread = 20.0 + step as f64 * 15.0;
        session.pointer(
            PointerPhase::Move,
            &[p(1, 120.0 - spread, 120.0), p(2, 120.0 + spread, 120.0)],
        );
        assert!(session.transform().covers(&bounds, 1e-6));
    }
    for _ in 0..30 {
        session.wheel(300.0, 10.0, 1.0);
        assert!(session.transform().covers(&bounds, 1e-6));
    }
    session.pointer(PointerPhase::Up, &[]);

    let rect = session.visible_rect().unwrap();
    assert!(rect.x + rect.width <= 400);
    assert!(rect.y + rect.height <= 300);
}

#[test]
fn failed_load_then_retry() {
    let mut session = CropSession::default();
    let log = collect_events(&mut session);
    session.show(100, 100);

    let err = session
        .load(ImageSource::Encoded(vec![0xFF, 0xD8, 0x00]))
        .unwrap_err();
    assert_eq!(err.code(), 1);
    assert_eq!(session.state(), LoadState::Idle);

    session.load(ImageSource::Encoded(split_png())).unwrap();
    assert_eq!(session.state(), LoadState::Loaded);
    assert!(session.can_save());

    let errors = log
        .borrow()
        .iter()
        .filter(|e| matches!(e, SessionEvent::Error(_)))
        .count();
    assert_eq!(errors, 1);
}
