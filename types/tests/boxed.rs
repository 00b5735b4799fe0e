use std::f64::consts::PI;
use std::fmt::Debug;

use anybox_types::{BoxError, Boxable, Boxed, unbox_json};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

trait Shape: Boxable<Error = serde_json::Error> + Debug {
    fn area(&self) -> f64;
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Circle {
    radius: f64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Square {
    side: f64,
}

impl Boxable for Circle {
    type Error = serde_json::Error;

    fn unbox(&mut self, raw: &RawValue) -> Result<(), Self::Error> {
        unbox_json(self, raw)
    }
}

impl Boxable for Square {
    type Error = serde_json::Error;

    fn unbox(&mut self, raw: &RawValue) -> Result<(), Self::Error> {
        unbox_json(self, raw)
    }
}

impl Shape for Circle {
    fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }
}

impl Shape for Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }
}

fn shape_candidates() -> Vec<Box<dyn Shape>> {
    vec![Box::new(Circle::default()), Box::new(Square::default())]
}

#[test]
fn trait_object_resolves_to_matching_shape() {
    let square = Boxed::new(Square { side: 3.0 }).unwrap();
    let mut decoded = Boxed::<Box<dyn Shape>>::from_slice(&square.to_vec()).unwrap();

    let shape = decoded.resolve(shape_candidates()).unwrap();
    assert!((shape.area() - 9.0).abs() < f64::EPSILON);
}

#[test]
fn trait_object_without_match_reports_last_candidate() {
    let mut decoded =
        Boxed::<Box<dyn Shape>>::from_json_str(r#"{"Data":{"sides":5}}"#).unwrap();

    let err = decoded.resolve(shape_candidates()).unwrap_err();
    let cause = err.last_cause().expect("square rejected the payload").to_string();
    assert!(cause.contains("expected `side`"), "unexpected cause: {cause}");
    assert!(decoded.data().is_none());
}

#[derive(Debug, Serialize, Deserialize)]
struct Job {
    #[serde(rename = "ID")]
    id: u64,
    #[serde(rename = "Spec")]
    spec: Boxed<JobSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum JobSpec {
    Shell { command: String },
    Http { url: String, retries: u8 },
}

impl Boxable for JobSpec {
    type Error = serde_json::Error;

    fn unbox(&mut self, raw: &RawValue) -> Result<(), Self::Error> {
        unbox_json(self, raw)
    }
}

#[test]
fn box_nests_inside_larger_document() {
    let spec = JobSpec::Http {
        url: "https://example.com/hook".to_owned(),
        retries: 3,
    };
    let job = Job {
        id: 7,
        spec: Boxed::new(spec.clone()).unwrap(),
    };

    let json = serde_json::to_string(&job).unwrap();
    assert_eq!(
        json,
        r#"{"ID":7,"Spec":{"Data":{"url":"https://example.com/hook","retries":3}}}"#
    );

    let mut decoded: Job = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.id, job.id);
    assert_eq!(decoded.spec.raw().get(), job.spec.raw().get());
    assert!(!decoded.spec.is_resolved());

    let placeholder = JobSpec::Shell {
        command: String::new(),
    };
    decoded.spec.resolve([placeholder]).unwrap();
    assert_eq!(decoded.spec.into_data(), Some(spec));
}

#[test]
fn lowercase_data_key_decodes_inside_outer_document() {
    let job: Job =
        serde_json::from_str(r#"{"ID":1,"Spec":{"data":{"command":"ls"}}}"#).unwrap();
    assert_eq!(job.spec.raw().get(), r#"{"command":"ls"}"#);
}

#[test]
fn envelope_error_surfaces_through_outer_document() {
    let err = serde_json::from_str::<Job>(r#"{"ID":1,"Spec":[{"command":"ls"}]}"#).unwrap_err();
    assert!(err.to_string().contains("box envelope"), "unexpected error: {err}");

    let err = serde_json::from_str::<Job>(r#"{"ID":1,"Spec":{"Other":{}}}"#).unwrap_err();
    assert!(err.to_string().contains("Data"), "unexpected error: {err}");
}

#[test]
fn construction_then_round_trip_matches_original() {
    let original = JobSpec::Shell {
        command: "echo hi".to_owned(),
    };
    let payload = Boxed::new(original.clone()).unwrap().to_vec();

    let mut decoded = Boxed::<JobSpec>::from_slice(&payload).unwrap();
    match decoded.resolve(Vec::new()) {
        Err(BoxError::NoCandidateMatched(None)) => {}
        other => panic!("expected empty-candidate failure, got {other:?}"),
    }

    let placeholder = JobSpec::Http {
        url: String::new(),
        retries: 0,
    };
    assert_eq!(decoded.resolve([placeholder]).unwrap(), &original);
}
