//! Animation stacks, layers and curves.
//!
//! A stack is a named take made of layers. Each layer holds, per node, at
//! most one curve per transform channel component. Curves reference nodes by
//! [`NodeId`] so renaming never breaks the binding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scene::NodeId;

/// A single key on an animation curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Key time in seconds
    pub time: f64,

    pub value: f64,

    /// Incoming derivative
    #[serde(default)]
    pub in_tangent: f64,

    /// Outgoing derivative
    #[serde(default)]
    pub out_tangent: f64,
}

impl Keyframe {
    /// A key with flat tangents.
    pub fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }
}

/// A time-ordered keyframe sequence driving one channel component.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimCurve {
    pub keys: Vec<Keyframe>,
}

impl AnimCurve {
    pub fn new(keys: Vec<Keyframe>) -> Self {
        Self { keys }
    }

    /// A curve holding a single constant key at time zero.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![Keyframe::new(0.0, value)])
    }

    /// The curve's resting value: the value of its first key.
    pub fn value(&self) -> Option<f64> {
        self.keys.first().map(|k| k.value)
    }

    /// Multiply every key value and both tangents by `factor`.
    pub fn scale_values_and_tangents(&mut self, factor: f64) {
        for key in &mut self.keys {
            key.value *= factor;
            key.in_tangent *= factor;
            key.out_tangent *= factor;
        }
    }

    /// Remove all keys.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

/// Transform channel a curve drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Translation,
    Rotation,
    Scale,
}

/// Per-axis curves of one channel.
pub type ChannelCurves = [Option<AnimCurve>; 3];

/// All curves one layer holds for one node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCurves {
    #[serde(default)]
    pub translation: ChannelCurves,

    #[serde(default)]
    pub rotation: ChannelCurves,

    #[serde(default)]
    pub scale: ChannelCurves,
}

impl NodeCurves {
    pub fn channel(&self, channel: Channel) -> &ChannelCurves {
        match channel {
            Channel::Translation => &self.translation,
            Channel::Rotation => &self.rotation,
            Channel::Scale => &self.scale,
        }
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut ChannelCurves {
        match channel {
            Channel::Translation => &mut self.translation,
            Channel::Rotation => &mut self.rotation,
            Channel::Scale => &mut self.scale,
        }
    }

    pub fn set(&mut self, channel: Channel, axis: usize, curve: AnimCurve) {
        self.channel_mut(channel)[axis] = Some(curve);
    }

    pub fn get(&self, channel: Channel, axis: usize) -> Option<&AnimCurve> {
        self.channel(channel)[axis].as_ref()
    }
}

/// A layer of animation curves, keyed by node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationLayer {
    pub name: String,

    #[serde(default)]
    pub curves: BTreeMap<NodeId, NodeCurves>,
}

impl AnimationLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            curves: BTreeMap::new(),
        }
    }

    /// Curves for a node, if the layer animates it.
    pub fn node(&self, id: NodeId) -> Option<&NodeCurves> {
        self.curves.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeCurves> {
        self.curves.get_mut(&id)
    }

    /// Attach a curve to a node channel, replacing any existing one.
    pub fn set_curve(&mut self, id: NodeId, channel: Channel, axis: usize, curve: AnimCurve) {
        self.curves.entry(id).or_default().set(channel, axis, curve);
    }

    pub fn curve(&self, id: NodeId, channel: Channel, axis: usize) -> Option<&AnimCurve> {
        self.node(id).and_then(|c| c.get(channel, axis))
    }
}

/// A named animation take made of layers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationStack {
    pub name: String,

    #[serde(default)]
    pub layers: Vec<AnimationLayer>,
}

impl AnimationStack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: AnimationLayer) -> Self {
        self.layers.push(layer);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_values_and_tangents() {
        let mut curve = AnimCurve::new(vec![
            Keyframe { time: 0.0, value: 1.0, in_tangent: 0.5, out_tangent: -0.5 },
            Keyframe { time: 1.0, value: -3.0, in_tangent: 2.0, out_tangent: 0.0 },
        ]);
        curve.scale_values_and_tangents(10.0);

        assert_eq!(curve.keys[0].value, 10.0);
        assert_eq!(curve.keys[0].in_tangent, 5.0);
        assert_eq!(curve.keys[0].out_tangent, -5.0);
        assert_eq!(curve.keys[1].value, -30.0);
        assert_eq!(curve.keys[1].in_tangent, 20.0);
        // Times are untouched
        assert_eq!(curve.keys[1].time, 1.0);
    }

    #[test]
    fn test_curve_value_is_first_key() {
        assert_eq!(AnimCurve::constant(2.0).value(), Some(2.0));
        assert_eq!(AnimCurve::default().value(), None);
    }

    #[test]
    fn test_layer_curve_lookup() {
        let mut layer = AnimationLayer::new("Base");
        layer.set_curve(NodeId(4), Channel::Scale, 1, AnimCurve::constant(3.0));

        assert!(layer.curve(NodeId(4), Channel::Scale, 1).is_some());
        assert!(layer.curve(NodeId(4), Channel::Scale, 0).is_none());
        assert!(layer.curve(NodeId(4), Channel::Translation, 1).is_none());
        assert!(layer.curve(NodeId(5), Channel::Scale, 1).is_none());
    }
}
