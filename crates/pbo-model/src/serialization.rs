use pbo_core::errors::{ErrorInfo, PboError};
use pbo_core::VariableIndex;
use serde::{Deserialize, Serialize};

use crate::model::TableModel;

/// Serializes the model to a JSON string.
pub fn model_to_json(model: &TableModel) -> Result<String, PboError> {
    let serializable = SerializableModel::from_model(model);
    serde_json::to_string_pretty(&serializable)
        .map_err(|err| PboError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a model from a JSON string, re-validating every factor.
pub fn model_from_json(json: &str) -> Result<TableModel, PboError> {
    let serializable: SerializableModel = serde_json::from_str(json)
        .map_err(|err| PboError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))?;
    serializable.into_model()
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableModel {
    cardinalities: Vec<usize>,
    factors: Vec<SerializableFactor>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableFactor {
    variables: Vec<VariableIndex>,
    values: Vec<f64>,
}

impl SerializableModel {
    fn from_model(model: &TableModel) -> Self {
        let factors = model
            .factors()
            .iter()
            .map(|factor| SerializableFactor {
                variables: factor.variables().to_vec(),
                values: factor.values().to_vec(),
            })
            .collect();
        Self {
            cardinalities: model.cardinalities().to_vec(),
            factors,
        }
    }

    fn into_model(self) -> Result<TableModel, PboError> {
        let mut model = TableModel::new(self.cardinalities);
        for factor in self.factors {
            model.add_factor(factor.variables, factor.values)?;
        }
        Ok(model)
    }
}
