use super::*;

fn blank() -> Page {
    Page {
        size_mm: Size::new(210.0, 297.0),
        ops: vec![DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            rgb: [255, 0, 0],
        }],
    }
}

#[test]
fn in_memory_sink_records_pages_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        page_size_mm: Size::new(210.0, 297.0),
        page_count: 2,
        title: "t".into(),
    })
    .unwrap();
    sink.push_page(PageIndex(0), &blank()).unwrap();
    sink.push_page(PageIndex(1), &blank()).unwrap();
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.pages().len(), 2);
    assert_eq!(sink.config().unwrap().page_count, 2);
}

#[test]
fn out_of_order_pages_are_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        page_size_mm: Size::new(210.0, 297.0),
        page_count: 2,
        title: "t".into(),
    })
    .unwrap();
    assert!(sink.push_page(PageIndex(1), &blank()).is_err());
    sink.push_page(PageIndex(0), &blank()).unwrap();
    assert!(sink.push_page(PageIndex(0), &blank()).is_err());
}
