//! Multilayer perceptron candidate.
//!
//! The network maps the nine board signs (`1` for X, `-1` for O, `0` for empty)
//! to nine output activations, one per cell, and plays the cell with the
//! highest activation. Nothing forces that cell to be empty: learning to avoid
//! occupied cells is part of what the optimizer has to discover.
//!
//! # Parameter Layout
//!
//! Every non-input unit owns `inputs + 1` weights, the bias being the LAST
//! weight (the unit's input vector is extended with a trailing constant `1`).
//! The flat parameter vector lists layers in order, units in order within a
//! layer, and each unit's weights in order:
//!
//! ```text
//! [ layer1.unit0.w0 .. layer1.unit0.bias, layer1.unit1.w0 .. , layer2.unit0.w0 .. ]
//! ```
//!
//! so `parameter_count = Σ units(l) × (units(l - 1) + 1)`. A `[9, 9, 9]`
//! network has 180 parameters.
//!
//! # Activation
//!
//! Hidden and output units use the logistic sigmoid. The output layer is then
//! passed through softmax; the chosen move is the arg-max, the first index
//! winning ties.
//!
//! # Persistence
//!
//! [`Mlp`] serializes through [`MlpRecord`]: the topology plus, per layer and
//! per unit, the unit's input count and weight vector (bias last).

use noughts_engine::{Board, CELL_COUNT};
use serde::{Deserialize, Serialize};

use crate::policy::{ParameterCountError, Policy, PolicyError, Trainable};

/// A structural problem with a network topology or a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TopologyError {
    #[display("topology needs at least an input and an output layer, got {layers} layer(s)")]
    TooFewLayers { layers: usize },
    #[display("input layer must have 9 units, got {actual}")]
    InputSize { actual: usize },
    #[display("output layer must have 9 units, got {actual}")]
    OutputSize { actual: usize },
    #[display("layer {layer} has no units")]
    EmptyLayer { layer: usize },
    #[display("expected {expected} weight layers, got {actual}")]
    LayerCount { expected: usize, actual: usize },
    #[display("layer {layer}: expected {expected} units, got {actual}")]
    UnitCount {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    #[display("layer {layer}, unit {unit}: expected {expected} inputs, got {actual}")]
    UnitInputs {
        layer: usize,
        unit: usize,
        expected: usize,
        actual: usize,
    },
    #[display("layer {layer}, unit {unit}: expected {expected} weights, got {actual}")]
    UnitWeights {
        layer: usize,
        unit: usize,
        expected: usize,
        actual: usize,
    },
}

/// One fully connected layer; unit weights are stored contiguously.
#[derive(Debug, Clone, PartialEq)]
struct Layer {
    inputs: usize,
    units: usize,
    weights: Vec<f32>,
}

impl Layer {
    fn zeroed(inputs: usize, units: usize) -> Self {
        Self {
            inputs,
            units,
            weights: vec![0.0; units * (inputs + 1)],
        }
    }

    fn unit_weights(&self) -> impl Iterator<Item = &[f32]> {
        self.weights.chunks_exact(self.inputs + 1)
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        debug_assert_eq!(input.len(), self.inputs);
        self.unit_weights()
            .map(|w| {
                let (weights, bias) = w.split_at(self.inputs);
                let z = weights.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + bias[0];
                sigmoid(z)
            })
            .collect()
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(values: &mut [f32]) {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in values {
        *v /= sum;
    }
}

/// A feed-forward network playing as the candidate.
///
/// # Example
///
/// ```
/// use noughts_engine::Board;
/// use noughts_evaluator::{mlp::Mlp, policy::{Policy as _, Trainable as _}};
///
/// let mut mlp = Mlp::new(vec![9, 4, 9]).unwrap();
/// assert_eq!(mlp.parameter_count(), 4 * 10 + 9 * 5);
///
/// // All-zero weights give a uniform output; the first cell wins the tie.
/// assert_eq!(mlp.predict(&Board::EMPTY).unwrap(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MlpRecord", into = "MlpRecord")]
pub struct Mlp {
    topology: Vec<usize>,
    layers: Vec<Layer>,
}

impl Mlp {
    /// Creates a network with all weights set to zero.
    ///
    /// The topology lists the unit count of every layer, input layer first.
    /// Input and output layers must both have nine units.
    pub fn new(topology: Vec<usize>) -> Result<Self, TopologyError> {
        validate_topology(&topology)?;
        let layers = topology
            .windows(2)
            .map(|w| Layer::zeroed(w[0], w[1]))
            .collect();
        Ok(Self { topology, layers })
    }

    #[must_use]
    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    /// Returns the softmax-normalized output activations for `board`.
    #[must_use]
    pub fn probabilities(&self, board: &Board) -> Vec<f32> {
        let mut activation = board.signs().map(f32::from).to_vec();
        for layer in &self.layers {
            activation = layer.forward(&activation);
        }
        softmax(&mut activation);
        activation
    }

    /// Returns the flat parameter vector in the layout accepted by
    /// [`Trainable::load_parameters`].
    #[must_use]
    pub fn parameters(&self) -> Vec<f32> {
        self.layers
            .iter()
            .flat_map(|l| l.weights.iter().copied())
            .collect()
    }

    #[must_use]
    pub fn to_record(&self) -> MlpRecord {
        MlpRecord {
            topology: self.topology.clone(),
            neurons: self
                .layers
                .iter()
                .map(|layer| {
                    layer
                        .unit_weights()
                        .map(|w| NeuronRecord {
                            inputs: layer.inputs,
                            weights: w.to_vec(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

fn validate_topology(topology: &[usize]) -> Result<(), TopologyError> {
    if topology.len() < 2 {
        return Err(TopologyError::TooFewLayers {
            layers: topology.len(),
        });
    }
    if let Some(layer) = topology.iter().position(|&units| units == 0) {
        return Err(TopologyError::EmptyLayer { layer });
    }
    let (input, output) = (topology[0], topology[topology.len() - 1]);
    if input != CELL_COUNT {
        return Err(TopologyError::InputSize { actual: input });
    }
    if output != CELL_COUNT {
        return Err(TopologyError::OutputSize { actual: output });
    }
    Ok(())
}

impl Policy for Mlp {
    fn predict(&mut self, board: &Board) -> Result<usize, PolicyError> {
        let probabilities = self.probabilities(board);
        let mut best = 0;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = i;
            }
        }
        Ok(best)
    }
}

impl Trainable for Mlp {
    fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len()).sum()
    }

    fn load_parameters(&mut self, parameters: &[f32]) -> Result<(), ParameterCountError> {
        let expected = self.parameter_count();
        if parameters.len() != expected {
            return Err(ParameterCountError {
                expected,
                actual: parameters.len(),
            });
        }
        let mut rest = parameters;
        for layer in &mut self.layers {
            let (head, tail) = rest.split_at(layer.weights.len());
            layer.weights.copy_from_slice(head);
            rest = tail;
        }
        Ok(())
    }
}

/// Persisted form of an [`Mlp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpRecord {
    pub topology: Vec<usize>,
    /// Per weight layer, per unit.
    pub neurons: Vec<Vec<NeuronRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronRecord {
    #[serde(alias = "n_params")]
    pub inputs: usize,
    /// `inputs` weights followed by the bias.
    pub weights: Vec<f32>,
}

impl From<Mlp> for MlpRecord {
    fn from(mlp: Mlp) -> Self {
        mlp.to_record()
    }
}

impl TryFrom<MlpRecord> for Mlp {
    type Error = TopologyError;

    fn try_from(record: MlpRecord) -> Result<Self, Self::Error> {
        let mut mlp = Mlp::new(record.topology)?;
        if record.neurons.len() != mlp.layers.len() {
            return Err(TopologyError::LayerCount {
                expected: mlp.layers.len(),
                actual: record.neurons.len(),
            });
        }
        for (layer_index, (layer, neurons)) in mlp.layers.iter_mut().zip(record.neurons).enumerate()
        {
            // weight layers are numbered from 1, matching the topology index of their units
            let layer_no = layer_index + 1;
            if neurons.len() != layer.units {
                return Err(TopologyError::UnitCount {
                    layer: layer_no,
                    expected: layer.units,
                    actual: neurons.len(),
                });
            }
            layer.weights.clear();
            for (unit, neuron) in neurons.into_iter().enumerate() {
                if neuron.inputs != layer.inputs {
                    return Err(TopologyError::UnitInputs {
                        layer: layer_no,
                        unit,
                        expected: layer.inputs,
                        actual: neuron.inputs,
                    });
                }
                if neuron.weights.len() != layer.inputs + 1 {
                    return Err(TopologyError::UnitWeights {
                        layer: layer_no,
                        unit,
                        expected: layer.inputs + 1,
                        actual: neuron.weights.len(),
                    });
                }
                layer.weights.extend(neuron.weights);
            }
        }
        Ok(mlp)
    }
}
