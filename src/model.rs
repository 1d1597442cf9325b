use std::fs::File;
use std::io::Read;

use image::imageops::FilterType;
use tensorflow::{Graph, ImportGraphDefOptions, Session, SessionOptions, SessionRunArgs, Tensor};

use crate::error::ModelError;

/// Height, width and channels the network was trained on.
pub const IMAGE_DIMENSIONS: (u64, u64, u64) = (28, 28, 3);

pub const INPUT_LEN: usize =
    (IMAGE_DIMENSIONS.0 * IMAGE_DIMENSIONS.1 * IMAGE_DIMENSIONS.2) as usize;

/// Anything that can turn a preprocessed image into class probabilities.
pub trait Classifier: Send {
    fn class_probabilities(&self, input: &[f32]) -> Result<Vec<f32>, ModelError>;
}

pub struct Model {
    session: Session,
    graph: Graph,
    input_op: String,
    output_op: String,
}

impl Model {
    pub fn new(model_path: &str, input_op: &str, output_op: &str) -> Result<Self, ModelError> {
        let mut graph = Graph::new();
        let mut model_file = File::open(model_path)?;
        let mut model_bytes = Vec::new();
        model_file.read_to_end(&mut model_bytes)?;

        graph.import_graph_def(&model_bytes, &ImportGraphDefOptions::new())?;

        for name in [input_op, output_op] {
            if graph.operation_by_name(name)?.is_none() {
                return Err(ModelError::MissingOperation(name.to_string()));
            }
        }

        let session = Session::new(&SessionOptions::new(), &graph)?;

        tracing::info!(
            path = model_path,
            input = input_op,
            output = output_op,
            "loaded frozen graph"
        );

        Ok(Model {
            session,
            graph,
            input_op: input_op.to_string(),
            output_op: output_op.to_string(),
        })
    }

    fn operation(&self, name: &str) -> Result<tensorflow::Operation, ModelError> {
        self.graph
            .operation_by_name(name)?
            .ok_or_else(|| ModelError::MissingOperation(name.to_string()))
    }
}

impl Classifier for Model {
    fn class_probabilities(&self, input: &[f32]) -> Result<Vec<f32>, ModelError> {
        if input.len() != INPUT_LEN {
            return Err(ModelError::InputSize {
                expected: INPUT_LEN,
                actual: input.len(),
            });
        }

        let (height, width, channels) = IMAGE_DIMENSIONS;
        let mut tensor = Tensor::new(&[1, height, width, channels]);
        tensor.copy_from_slice(input);

        let input_operation = self.operation(&self.input_op)?;
        let output_operation = self.operation(&self.output_op)?;

        let mut args = SessionRunArgs::new();
        args.add_feed(&input_operation, 0, &tensor);
        let output_token = args.request_fetch(&output_operation, 0);
        self.session.run(&mut args)?;

        let output_tensor: Tensor<f32> = args.fetch(output_token)?;
        Ok(output_tensor.to_vec())
    }
}

/// Decodes an upload and turns it into the network's input layout: RGB,
/// 28x28, row-major HWC, each channel scaled into [0, 1].
pub fn preprocess(image_data: &[u8]) -> Result<Vec<f32>, ModelError> {
    let img = image::load_from_memory(image_data)?.to_rgb8();

    let resized = image::imageops::resize(
        &img,
        IMAGE_DIMENSIONS.1 as u32,
        IMAGE_DIMENSIONS.0 as u32,
        FilterType::CatmullRom,
    );

    let flat_img: Vec<f32> = resized
        .pixels()
        .flat_map(|pixel| pixel.0)
        .map(|channel| channel as f32 / 255.0)
        .collect();

    debug_assert_eq!(flat_img.len(), INPUT_LEN);
    Ok(flat_img)
}
