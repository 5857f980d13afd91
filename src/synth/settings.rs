//! The patch: one `SynthSettings` record plus partial updates.
//!
//! `SynthSettings` is the single source of truth for how the engine
//! sounds. The facade owns one copy, the audio thread mirrors it, and the
//! two are kept in step by sending only the fields that changed.
//!
//! Every `*Update` struct is a diff: `None` means "leave as is". Merging
//! an update into settings returns the *effective* diff, i.e. the same
//! update with every field that did not actually change cleared, so
//! repeating a value never reschedules a ramp.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{filter::FilterType, oscillator::OscillatorWaveform};

/// Where the LFO is routed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoTarget {
    #[default]
    Filter,
    Pitch,
    Volume,
}

/// Oscillator modulation type.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModulationKind {
    #[default]
    None,
    Fm,
    Am,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationSettings {
    pub kind: ModulationKind,
    /// Harmonicity for AM; harmonicity and modulation index for FM.
    pub amount: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorSettings {
    pub waveform: OscillatorWaveform,
    /// Cents.
    pub detune: f32,
    pub modulation: Option<ModulationSettings>,
}

impl Default for OscillatorSettings {
    fn default() -> Self {
        Self {
            waveform: OscillatorWaveform::Sawtooth,
            detune: 0.0,
            modulation: None,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSettings {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for EnvelopeSettings {
    fn default() -> Self {
        Self {
            attack: 0.05,
            decay: 0.3,
            sustain: 0.4,
            release: 0.5,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    /// Cutoff in Hz.
    pub frequency: f32,
    pub q: f32,
    pub filter_type: FilterType,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            frequency: 2_000.0,
            q: 1.0,
            filter_type: FilterType::LowPass,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoSettings {
    /// Hz.
    pub frequency: f32,
    /// 0..1
    pub depth: f32,
    pub waveform: OscillatorWaveform,
    pub target: LfoTarget,
}

impl Default for LfoSettings {
    fn default() -> Self {
        Self {
            frequency: 5.0,
            depth: 0.0,
            waveform: OscillatorWaveform::Sine,
            target: LfoTarget::Filter,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectSettings {
    pub enabled: bool,
    pub wet: f32,
}

impl EffectSettings {
    /// Wet level actually sent to the node: boosted by 1.5 and capped at
    /// 1.0 when enabled, silent when bypassed.
    pub fn scaled_wet(&self) -> f32 {
        if self.enabled {
            (self.wet * 1.5).min(1.0)
        } else {
            0.0
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectsSettings {
    pub reverb: EffectSettings,
    pub delay: EffectSettings,
    pub distortion: EffectSettings,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthSettings {
    pub oscillator: OscillatorSettings,
    pub envelope: EnvelopeSettings,
    pub filter: FilterSettings,
    pub lfo: LfoSettings,
    pub effects: EffectsSettings,
    /// Master volume in dB.
    pub volume: f32,
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self {
            oscillator: OscillatorSettings::default(),
            envelope: EnvelopeSettings::default(),
            filter: FilterSettings::default(),
            lfo: LfoSettings::default(),
            effects: EffectsSettings::default(),
            volume: -6.0,
        }
    }
}

/// Write `new` into `slot` and report it back only if it differs.
fn merge_field<T: Copy + PartialEq>(slot: &mut T, new: Option<T>) -> Option<T> {
    match new {
        Some(value) if *slot != value => {
            *slot = value;
            Some(value)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OscillatorUpdate {
    pub waveform: Option<OscillatorWaveform>,
    pub detune: Option<f32>,
    /// `Some(None)` clears modulation (back to subtractive).
    pub modulation: Option<Option<ModulationSettings>>,
}

impl OscillatorUpdate {
    pub fn merge_into(&self, settings: &mut OscillatorSettings) -> Self {
        Self {
            waveform: merge_field(&mut settings.waveform, self.waveform),
            detune: merge_field(&mut settings.detune, self.detune),
            modulation: merge_field(&mut settings.modulation, self.modulation),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.waveform.is_none() && self.detune.is_none() && self.modulation.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvelopeUpdate {
    pub attack: Option<f32>,
    pub decay: Option<f32>,
    pub sustain: Option<f32>,
    pub release: Option<f32>,
}

impl EnvelopeUpdate {
    pub fn merge_into(&self, settings: &mut EnvelopeSettings) -> Self {
        Self {
            attack: merge_field(&mut settings.attack, self.attack),
            decay: merge_field(&mut settings.decay, self.decay),
            sustain: merge_field(&mut settings.sustain, self.sustain),
            release: merge_field(&mut settings.release, self.release),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attack.is_none() && self.decay.is_none() && self.sustain.is_none() && self.release.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterUpdate {
    pub frequency: Option<f32>,
    pub q: Option<f32>,
    pub filter_type: Option<FilterType>,
}

impl FilterUpdate {
    pub fn merge_into(&self, settings: &mut FilterSettings) -> Self {
        Self {
            frequency: merge_field(&mut settings.frequency, self.frequency),
            q: merge_field(&mut settings.q, self.q),
            filter_type: merge_field(&mut settings.filter_type, self.filter_type),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_none() && self.q.is_none() && self.filter_type.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LfoUpdate {
    pub frequency: Option<f32>,
    pub depth: Option<f32>,
    pub waveform: Option<OscillatorWaveform>,
    pub target: Option<LfoTarget>,
}

impl LfoUpdate {
    pub fn merge_into(&self, settings: &mut LfoSettings) -> Self {
        Self {
            frequency: merge_field(&mut settings.frequency, self.frequency),
            depth: merge_field(&mut settings.depth, self.depth.map(|d| d.clamp(0.0, 1.0))),
            waveform: merge_field(&mut settings.waveform, self.waveform),
            target: merge_field(&mut settings.target, self.target),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_none() && self.depth.is_none() && self.waveform.is_none() && self.target.is_none()
    }

    /// Routing has to be rebuilt when the target or depth moves.
    pub fn changes_routing(&self) -> bool {
        self.depth.is_some() || self.target.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectUpdate {
    pub enabled: Option<bool>,
    pub wet: Option<f32>,
}

impl EffectUpdate {
    pub fn merge_into(&self, settings: &mut EffectSettings) -> Self {
        Self {
            enabled: merge_field(&mut settings.enabled, self.enabled),
            wet: merge_field(&mut settings.wet, self.wet.map(|w| w.clamp(0.0, 1.0))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.wet.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectsUpdate {
    pub reverb: Option<EffectUpdate>,
    pub delay: Option<EffectUpdate>,
    pub distortion: Option<EffectUpdate>,
}

impl EffectsUpdate {
    pub fn merge_into(&self, settings: &mut EffectsSettings) -> Self {
        fn merge_effect(slot: &mut EffectSettings, update: Option<EffectUpdate>) -> Option<EffectUpdate> {
            update.map(|u| u.merge_into(slot)).filter(|diff| !diff.is_empty())
        }

        Self {
            reverb: merge_effect(&mut settings.reverb, self.reverb),
            delay: merge_effect(&mut settings.delay, self.delay),
            distortion: merge_effect(&mut settings.distortion, self.distortion),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reverb.is_none() && self.delay.is_none() && self.distortion.is_none()
    }
}
