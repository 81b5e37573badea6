mod common;

use common::{init_logging, ClampWidget, RecordingWidget};
use std::rc::Rc;
use transmitter::host::{Element, MemoryDocument, MemoryElement};
use transmitter::{Config, Transmitter, Value};

const SELECTOR: &str = "#chart";
const ATTRIBUTE: &str = "data-config";

fn host(initial: Option<&str>) -> (MemoryDocument, Rc<MemoryElement>) {
    let element = match initial {
        Some(value) => MemoryElement::new().with_attribute(ATTRIBUTE, value),
        None => MemoryElement::new(),
    };
    let element = Rc::new(element);
    let document = MemoryDocument::new();
    document.insert(SELECTOR, Rc::clone(&element));
    (document, element)
}

fn stored(element: &MemoryElement) -> Option<String> {
    element.attribute(ATTRIBUTE)
}

#[test]
fn test_construction_seeds_from_attribute() {
    init_logging();
    let (document, element) = host(Some("a=1&tags[]=x"));
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);

    assert!(transmitter.backend().is_bound());
    assert_eq!(
        transmitter.get(),
        Config::new().with("a", 1).with("tags", vec!["x"])
    );
    assert_eq!(element.write_count(), 0);
}

#[test]
fn test_same_value_update_writes_nothing() {
    let (document, element) = host(Some("a=1"));
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    let widget = RecordingWidget::new();
    transmitter.join(widget.clone());

    transmitter.update(Config::new().with("a", 1));

    assert_eq!(element.write_count(), 0);
    assert_eq!(widget.count(), 1);
}

#[test]
fn test_changed_value_is_written_then_fanned_out() {
    let (document, element) = host(Some("a=1"));
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    transmitter.with_defaults(Config::new().with("units", "kg"));
    let first = RecordingWidget::new();
    let second = RecordingWidget::new();
    transmitter.join(first.clone());
    transmitter.join(second.clone());

    transmitter.update(Config::new().with("a", 2));

    assert_eq!(element.write_count(), 1);
    assert_eq!(stored(&element).as_deref(), Some("a=2"));
    let expected = Config::new().with("a", 2).with("units", "kg");
    assert_eq!(first.last(), Some(expected.clone()));
    assert_eq!(second.last(), Some(expected));
    assert_eq!(first.count(), 2);
    assert_eq!(second.count(), 2);
}

#[test]
fn test_widget_change_goes_through_the_attribute() {
    let (document, element) = host(Some("a=1"));
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    let origin = RecordingWidget::new();
    let other = RecordingWidget::new();
    transmitter.join(origin.clone());
    transmitter.join(other.clone());

    origin.emit(Config::new().with("b", "x"));

    assert_eq!(stored(&element).as_deref(), Some("a=1&b=x"));
    let expected = Config::new().with("a", 1).with("b", "x");
    assert_eq!(origin.last(), Some(expected.clone()));
    assert_eq!(other.last(), Some(expected));
}

#[test]
fn test_external_write_replaces_configuration() {
    let (document, element) = host(Some("a=1&b=2"));
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    transmitter.with_defaults(Config::new().with("units", "kg"));
    let widget = RecordingWidget::new();
    transmitter.join(widget.clone());

    element.set_attribute(ATTRIBUTE, "a=5").unwrap();

    assert_eq!(
        widget.last(),
        Some(Config::new().with("a", 5).with("units", "kg"))
    );
    assert!(!transmitter.get().contains_key("b"));
    // Only the external write itself; the transmitter did not echo it back.
    assert_eq!(element.write_count(), 1);
}

#[test]
fn test_external_removal_falls_back_to_defaults() {
    let (document, element) = host(Some("a=1"));
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    transmitter.with_defaults(Config::new().with("units", "kg"));
    let widget = RecordingWidget::new();
    transmitter.join(widget.clone());

    element.remove_attribute(ATTRIBUTE);

    assert_eq!(widget.last(), Some(Config::new().with("units", "kg")));
    assert_eq!(transmitter.serialize(), "");
}

#[test]
fn test_other_attributes_are_not_observed() {
    let (document, element) = host(Some("a=1"));
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    let widget = RecordingWidget::new();
    transmitter.join(widget.clone());

    element.set_attribute("data-other", "a=9").unwrap();

    assert_eq!(widget.count(), 1);
    assert_eq!(transmitter.get().get("a"), Some(&Value::Number(1.0)));
}

#[test]
fn test_unresolved_element_behaves_like_memory() {
    let (document, element) = host(Some("a=1"));
    let transmitter = Transmitter::attribute(&document, "#missing", ATTRIBUTE);
    let widget = RecordingWidget::new();
    transmitter.join(widget.clone());

    transmitter.update("b=2");

    assert!(!transmitter.backend().is_bound());
    assert_eq!(widget.last(), Some(Config::new().with("b", 2)));
    assert_eq!(element.write_count(), 0);
    assert_eq!(stored(&element).as_deref(), Some("a=1"));
}

#[test]
fn test_element_added_later_is_not_picked_up() {
    let document = MemoryDocument::new();
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    let element = Rc::new(MemoryElement::new());
    document.insert(SELECTOR, Rc::clone(&element));

    transmitter.update("a=1");

    assert_eq!(element.write_count(), 0);
    assert_eq!(transmitter.get(), Config::new().with("a", 1));
}

#[test]
fn test_failed_write_still_reaches_widgets() {
    let (document, element) = host(Some("a=1"));
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    let widget = RecordingWidget::new();
    transmitter.join(widget.clone());
    element.set_simulate_write_error(true);

    transmitter.update("a=2");

    assert_eq!(stored(&element).as_deref(), Some("a=1"));
    assert_eq!(widget.last(), Some(Config::new().with("a", 2)));
}

#[test]
fn test_serialize_diffs_against_defaults() {
    let (document, _element) = host(Some("units=kg&scope=full"));
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    transmitter.with_defaults(Config::new().with("units", "kg"));

    assert_eq!(transmitter.serialize(), "scope=full");
}

#[test]
fn test_reentrant_widget_converges_through_the_attribute() {
    let (document, element) = host(None);
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    let observer = RecordingWidget::new();
    let clamp = ClampWidget::new("year", 2030.0);
    transmitter.join(observer.clone());
    transmitter.join(clamp.clone());

    transmitter.update("year=2050");

    assert_eq!(stored(&element).as_deref(), Some("year=2030"));
    assert_eq!(element.write_count(), 2);
    assert_eq!(observer.last().unwrap().get("year"), Some(&Value::Number(2030.0)));
}

#[test]
fn test_widget_gets_back_the_value_types_it_emitted() {
    let (document, element) = host(None);
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    let widget = RecordingWidget::new();
    transmitter.join(widget.clone());

    let emitted = Config::new()
        .with("year", "2020")
        .with("on", "true")
        .with("count", 3)
        .with("tags", vec![Value::Null, Value::from("1")])
        .with("", "x");
    widget.emit(emitted.clone());

    assert_eq!(element.write_count(), 1);
    assert_eq!(widget.last(), Some(emitted.clone()));
    assert_eq!(transmitter.get(), emitted);
}

#[test]
fn test_text_value_still_differs_from_numeric_default_after_roundtrip() {
    let (document, _element) = host(None);
    let transmitter = Transmitter::attribute(&document, SELECTOR, ATTRIBUTE);
    transmitter.with_defaults(Config::new().with("year", 2020));

    transmitter.update(Config::new().with("year", "2020"));

    assert_eq!(transmitter.get().get("year"), Some(&Value::from("2020")));
    assert_eq!(transmitter.serialize(), "year=%272020");
}
