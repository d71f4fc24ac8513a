//! Tie-breaks in the k-NN vote are reported at debug level.

use std::sync::Mutex;

use kval_classifiers::math::Array2;
use kval_classifiers::models::{ClassifierModel, KnnClassifier};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct Capture(Mutex<Vec<(Level, String)>>);

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.0.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: Capture = Capture(Mutex::new(Vec::new()));

#[test]
fn tie_break_is_logged_at_debug() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let x = Array2::from_shape_vec((4, 1), vec![0.0, 5.0, 6.0, 11.0]).unwrap();
    let q = Array2::from_shape_vec((1, 1), vec![5.5]).unwrap();
    let mut knn = KnnClassifier::<i64>::with_seed(2, 1).unwrap();
    knn.fit(&x, &[2, 2, 4, 4]).unwrap();
    knn.predict(&q).unwrap();

    let records = LOGGER.0.lock().unwrap();
    let ties: Vec<_> = records
        .iter()
        .filter(|(_, msg)| msg.starts_with("tie between"))
        .collect();
    assert_eq!(ties.len(), 1);
    assert_eq!(ties[0].0, Level::Debug);
}
