//! Output decoding: argmax over the raw score vector plus label lookup.

use crate::error::ClassifyError;
use crate::labels::LabelTable;

/// Terminal result of one classification request.
///
/// `score` is the raw network output for the winning class, not a
/// probability; no softmax is applied anywhere.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub index: usize,
    pub label: String,
    pub score: f32,
}

/// Index of the largest value, first occurrence winning ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, top)) if v > top => best = Some((i, v)),
            None => best = Some((i, v)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

/// Map the engine's output vector to a labeled prediction.
pub fn decode(output: &[f32], labels: &LabelTable) -> Result<Prediction, ClassifyError> {
    if output.len() != labels.len() {
        return Err(ClassifyError::LabelCount {
            labels: labels.len(),
            outputs: output.len(),
        });
    }
    let index = argmax(output)
        .ok_or_else(|| ClassifyError::EngineRun("inference returned an empty output".into()))?;
    let label = labels
        .get(index)
        .ok_or(ClassifyError::LabelCount {
            labels: labels.len(),
            outputs: output.len(),
        })?
        .to_owned();
    Ok(Prediction {
        index,
        label,
        score: output[index],
    })
}
