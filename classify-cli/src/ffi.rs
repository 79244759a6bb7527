//! C ABI for embedding the classifier in a non-Rust host.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_float};
use std::path::PathBuf;

use crate::FileClassifier;

/// Create a classifier from a model path and a label file path.
///
/// Returns null on failure. Release with [`classifier_free`].
#[no_mangle]
pub extern "C" fn classifier_new(
    model_path: *const c_char,
    labels_path: *const c_char,
) -> *mut FileClassifier {
    if model_path.is_null() || labels_path.is_null() {
        return std::ptr::null_mut();
    }
    let model = unsafe { CStr::from_ptr(model_path) };
    let labels = unsafe { CStr::from_ptr(labels_path) };
    let model = PathBuf::from(model.to_string_lossy().into_owned());
    let labels = PathBuf::from(labels.to_string_lossy().into_owned());
    match FileClassifier::new(&model, &labels) {
        Ok(classifier) => Box::into_raw(Box::new(classifier)),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Classify the image file at `image_path`.
///
/// Returns the winning label as a heap-allocated C string, or null on
/// failure. When `score_out` is non-null it receives the raw score. The
/// returned string must be released with [`string_free`].
#[no_mangle]
pub extern "C" fn classifier_classify_file(
    classifier: *mut FileClassifier,
    image_path: *const c_char,
    score_out: *mut c_float,
) -> *mut c_char {
    if classifier.is_null() || image_path.is_null() {
        return std::ptr::null_mut();
    }
    let classifier = unsafe { &mut *classifier };
    let path = unsafe { CStr::from_ptr(image_path) };
    let path = PathBuf::from(path.to_string_lossy().into_owned());
    match classifier.classify_file(&path) {
        Ok(prediction) => {
            if !score_out.is_null() {
                unsafe {
                    *score_out = prediction.score;
                }
            }
            match CString::new(prediction.label) {
                Ok(label) => label.into_raw(),
                Err(_) => std::ptr::null_mut(),
            }
        }
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn classifier_free(classifier: *mut FileClassifier) {
    if !classifier.is_null() {
        unsafe {
            drop(Box::from_raw(classifier));
        }
    }
}

#[no_mangle]
pub extern "C" fn string_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}
