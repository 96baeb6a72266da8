//! Earth Engine expression graphs.
//!
//! Every image operation is an Earth Engine algorithm invocation. Nothing is
//! computed locally: the graph is serialized as nested `ValueNode`s and
//! evaluated server-side when a value or a map is requested.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Value, json};

use crate::core::geometry::Roi;

use super::{CollectionQuery, RegionStatsOptions};

/// One node of an Earth Engine expression.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueNode {
    ConstantValue(Value),
    FunctionInvocationValue(FunctionInvocation),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocation {
    pub function_name: String,
    pub arguments: BTreeMap<String, ValueNode>,
}

impl ValueNode {
    pub fn constant(value: impl Into<Value>) -> Self {
        ValueNode::ConstantValue(value.into())
    }

    pub fn invoke<'a>(
        function_name: &str,
        arguments: impl IntoIterator<Item = (&'a str, ValueNode)>,
    ) -> Self {
        ValueNode::FunctionInvocationValue(FunctionInvocation {
            function_name: function_name.to_string(),
            arguments: arguments
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        })
    }

    /// Name of the invoked algorithm, `None` for constants.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            ValueNode::FunctionInvocationValue(call) => Some(&call.function_name),
            ValueNode::ConstantValue(_) => None,
        }
    }

    pub fn argument(&self, name: &str) -> Option<&ValueNode> {
        match self {
            ValueNode::FunctionInvocationValue(call) => call.arguments.get(name),
            ValueNode::ConstantValue(_) => None,
        }
    }
}

/// Top-level expression as accepted by `value:compute` and `maps`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Expression {
    pub result: String,
    pub values: BTreeMap<String, ValueNode>,
}

impl Expression {
    pub fn new(root: ValueNode) -> Self {
        let mut values = BTreeMap::new();
        values.insert("0".to_string(), root);
        Self {
            result: "0".to_string(),
            values,
        }
    }
}

pub fn polygon(roi: &Roi) -> ValueNode {
    ValueNode::invoke(
        "GeometryConstructors.Polygon",
        [("coordinates", ValueNode::constant(json!(roi.coordinates)))],
    )
}

fn filter(collection: ValueNode, filter: ValueNode) -> ValueNode {
    ValueNode::invoke(
        "Collection.filter",
        [("collection", collection), ("filter", filter)],
    )
}

/// Catalog query: polarisation, instrument mode, resolution, bounds, then date range.
pub fn image_collection(query: &CollectionQuery) -> ValueNode {
    let collection = ValueNode::invoke(
        "ImageCollection.load",
        [("id", ValueNode::constant(query.collection_id.as_str()))],
    );
    let collection = filter(
        collection,
        ValueNode::invoke(
            "Filter.listContains",
            [
                (
                    "leftField",
                    ValueNode::constant("transmitterReceiverPolarisation"),
                ),
                ("rightValue", ValueNode::constant(query.polarization.band())),
            ],
        ),
    );
    let collection = filter(
        collection,
        ValueNode::invoke(
            "Filter.equals",
            [
                ("leftField", ValueNode::constant("instrumentMode")),
                (
                    "rightValue",
                    ValueNode::constant(query.instrument_mode.to_string()),
                ),
            ],
        ),
    );
    let collection = filter(
        collection,
        ValueNode::invoke(
            "Filter.equals",
            [
                ("leftField", ValueNode::constant("resolution_meters")),
                ("rightValue", ValueNode::constant(query.resolution_meters)),
            ],
        ),
    );
    let collection = filter(
        collection,
        ValueNode::invoke(
            "Filter.intersects",
            [
                ("leftField", ValueNode::constant(".all")),
                ("rightValue", polygon(&query.roi)),
            ],
        ),
    );
    filter(
        collection,
        ValueNode::invoke(
            "Filter.dateRangeContains",
            [
                (
                    "leftValue",
                    ValueNode::invoke(
                        "DateRange",
                        [
                            ("start", ValueNode::constant(query.start.to_string())),
                            ("end", ValueNode::constant(query.end.to_string())),
                        ],
                    ),
                ),
                ("rightField", ValueNode::constant("system:time_start")),
            ],
        ),
    )
}

pub fn median(collection: ValueNode) -> ValueNode {
    ValueNode::invoke("reduce.median", [("collection", collection)])
}

pub fn select(image: ValueNode, band: &str) -> ValueNode {
    ValueNode::invoke(
        "Image.select",
        [
            ("input", image),
            ("bandSelectors", ValueNode::constant(json!([band]))),
        ],
    )
}

pub fn clip(image: ValueNode, roi: &Roi) -> ValueNode {
    ValueNode::invoke("Image.clip", [("input", image), ("geometry", polygon(roi))])
}

pub fn focal_mean(image: ValueNode, radius_meters: f64) -> ValueNode {
    ValueNode::invoke(
        "Image.focal_mean",
        [
            ("image", image),
            ("radius", ValueNode::constant(radius_meters)),
            ("kernelType", ValueNode::constant("circle")),
            ("units", ValueNode::constant("meters")),
        ],
    )
}

pub fn subtract(image1: ValueNode, image2: ValueNode) -> ValueNode {
    ValueNode::invoke("Image.subtract", [("image1", image1), ("image2", image2)])
}

pub fn greater_than(image: ValueNode, threshold: f64) -> ValueNode {
    let constant = ValueNode::invoke("Image.constant", [("value", ValueNode::constant(threshold))]);
    ValueNode::invoke("Image.gt", [("image1", image), ("image2", constant)])
}

/// `mean` and `stdDev` over the same inputs, yielding `<band>_mean` / `<band>_stdDev`.
pub fn mean_std_dev_reducer() -> ValueNode {
    ValueNode::invoke(
        "Reducer.combine",
        [
            ("reducer1", ValueNode::invoke("Reducer.mean", [])),
            ("reducer2", ValueNode::invoke("Reducer.stdDev", [])),
            ("sharedInputs", ValueNode::constant(true)),
        ],
    )
}

pub fn reduce_region(image: ValueNode, roi: &Roi, options: &RegionStatsOptions) -> ValueNode {
    ValueNode::invoke(
        "Image.reduceRegion",
        [
            ("image", image),
            ("reducer", mean_std_dev_reducer()),
            ("geometry", polygon(roi)),
            ("scale", ValueNode::constant(options.scale)),
            ("maxPixels", ValueNode::constant(options.max_pixels)),
            ("bestEffort", ValueNode::constant(options.best_effort)),
        ],
    )
}
