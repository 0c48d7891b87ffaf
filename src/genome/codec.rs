//! Sign/exponent/mantissa bit codec
//!
//! A bounded real value is stored as `bits_per_var` bits laid out as
//! `[sign][exponent_bits][mantissa_bits]`, a reduced-width floating point
//! format with an implicit leading one and no subnormals. Zero is the
//! all-zero pattern. The representation is lossy: within the representable
//! exponent range the relative quantization error is at most
//! `2^-mantissa_bits`.

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError, GenomeError};
use crate::genome::bit_string::{read_unsigned, BitString};
use crate::genome::bounds::{Bounds, MultiBounds};

/// Widest exponent field supported (keeps every exponent inside `f64` range)
pub const MAX_EXPONENT_BITS: usize = 11;

/// Widest mantissa field supported (the `f64` fraction width)
pub const MAX_MANTISSA_BITS: usize = 52;

/// Per-dimension float codec
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitCodec {
    bits_per_var: usize,
    exponent_bits: usize,
    mantissa_bits: usize,
    bias: i64,
}

impl BitCodec {
    /// Create a codec with `bits_per_var` total bits of which `exponent_bits`
    /// hold the biased exponent; one bit is the sign and the rest the mantissa
    pub fn new(bits_per_var: usize, exponent_bits: usize) -> EvoResult<Self> {
        if exponent_bits == 0 || exponent_bits > MAX_EXPONENT_BITS {
            return Err(EvolutionError::Configuration(format!(
                "exponent_bits must be in [1, {}], got {}",
                MAX_EXPONENT_BITS, exponent_bits
            )));
        }
        if bits_per_var < exponent_bits + 1 {
            return Err(EvolutionError::Configuration(format!(
                "bits_per_var ({}) must hold a sign bit and {} exponent bits",
                bits_per_var, exponent_bits
            )));
        }
        let mantissa_bits = bits_per_var - exponent_bits - 1;
        if mantissa_bits > MAX_MANTISSA_BITS {
            return Err(EvolutionError::Configuration(format!(
                "mantissa_bits must be at most {}, got {}",
                MAX_MANTISSA_BITS, mantissa_bits
            )));
        }

        Ok(Self {
            bits_per_var,
            exponent_bits,
            mantissa_bits,
            bias: (1i64 << (exponent_bits - 1)) - 1,
        })
    }

    /// Total bits per encoded value
    pub fn bits_per_var(&self) -> usize {
        self.bits_per_var
    }

    /// Width of the exponent field
    pub fn exponent_bits(&self) -> usize {
        self.exponent_bits
    }

    /// Width of the mantissa field
    pub fn mantissa_bits(&self) -> usize {
        self.mantissa_bits
    }

    /// Exponent bias, `2^(exponent_bits - 1) - 1`
    pub fn bias(&self) -> i64 {
        self.bias
    }

    fn max_biased_exponent(&self) -> u64 {
        (1u64 << self.exponent_bits) - 1
    }

    fn max_mantissa_field(&self) -> u64 {
        (1u64 << self.mantissa_bits) - 1
    }

    fn mantissa_scale(&self) -> f64 {
        (1u64 << self.mantissa_bits) as f64
    }

    /// Largest magnitude the codec can represent
    pub fn max_magnitude(&self) -> f64 {
        let top = self.max_biased_exponent() as i64 - self.bias;
        (1.0 + self.max_mantissa_field() as f64 / self.mantissa_scale()) * (top as f64).exp2()
    }

    /// Smallest magnitude that encodes to a non-zero pattern for both signs
    ///
    /// `2^-bias` has a zero biased exponent and an empty mantissa field.
    /// For `+2^-bias` that is the zero pattern, while `-2^-bias` keeps its
    /// sign bit and stays non-zero.
    pub fn min_magnitude(&self) -> f64 {
        if self.mantissa_bits == 0 {
            ((1 - self.bias) as f64).exp2()
        } else {
            (1.0 + 1.0 / self.mantissa_scale()) * (-self.bias as f64).exp2()
        }
    }

    /// Encode a value into `bits_per_var` bits after clamping it into `bounds`
    pub fn encode(&self, value: f64, bounds: &Bounds) -> BitString {
        let value = bounds.clamp(value);
        if value == 0.0 || value.is_nan() {
            return BitString::zeros(self.bits_per_var);
        }

        let negative = value < 0.0;
        let magnitude = value.abs();

        // log2 can land one off near exact powers of two
        let mut exponent = magnitude.log2().floor() as i64;
        if (exponent as f64).exp2() > magnitude {
            exponent -= 1;
        } else if ((exponent + 1) as f64).exp2() <= magnitude {
            exponent += 1;
        }

        let mut biased = exponent + self.bias;
        if biased < 0 {
            // flush to zero, no subnormals
            return BitString::zeros(self.bits_per_var);
        }

        let mantissa = magnitude / (exponent as f64).exp2();
        let mut field = ((mantissa - 1.0) * self.mantissa_scale()).round() as u64;
        if field > self.max_mantissa_field() {
            // rounding carried into the implicit bit
            field = 0;
            biased += 1;
        }

        let (biased, field) = if biased as u64 > self.max_biased_exponent() {
            (self.max_biased_exponent(), self.max_mantissa_field())
        } else {
            (biased as u64, field)
        };

        let mut bits = BitString::with_capacity(self.bits_per_var);
        bits.push(negative);
        bits.push_unsigned(biased, self.exponent_bits);
        bits.push_unsigned(field, self.mantissa_bits);
        bits
    }

    /// Decode exactly `bits_per_var` bits back into a value clamped into `bounds`
    pub fn decode(&self, bits: &[bool], bounds: &Bounds) -> Result<f64, GenomeError> {
        if bits.len() != self.bits_per_var {
            return Err(GenomeError::MalformedGenotype {
                expected: self.bits_per_var,
                actual: bits.len(),
            });
        }
        if bits.iter().all(|&b| !b) {
            return Ok(bounds.clamp(0.0));
        }

        let exponent_end = 1 + self.exponent_bits;
        let biased = read_unsigned(&bits[1..exponent_end]) as i64;
        let field = read_unsigned(&bits[exponent_end..]);

        let mantissa = 1.0 + field as f64 / self.mantissa_scale();
        let magnitude = mantissa * ((biased - self.bias) as f64).exp2();
        let value = if bits[0] { -magnitude } else { magnitude };

        Ok(bounds.clamp(value))
    }
}

/// Whole-genotype codec: one [`BitCodec`] field per dimension, concatenated
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorCodec {
    codec: BitCodec,
    bounds: MultiBounds,
}

impl VectorCodec {
    /// Create a codec for the given per-dimension bounds
    pub fn new(codec: BitCodec, bounds: MultiBounds) -> Self {
        Self { codec, bounds }
    }

    /// The per-dimension codec
    pub fn codec(&self) -> &BitCodec {
        &self.codec
    }

    /// The per-dimension bounds
    pub fn bounds(&self) -> &MultiBounds {
        &self.bounds
    }

    /// Number of encoded dimensions
    pub fn num_vars(&self) -> usize {
        self.bounds.dimension()
    }

    /// Exact genotype length, `num_vars * bits_per_var`
    pub fn genotype_len(&self) -> usize {
        self.num_vars() * self.codec.bits_per_var()
    }

    /// Encode a phenotype, one field per dimension
    pub fn encode(&self, phenotype: &[f64]) -> Result<BitString, GenomeError> {
        if phenotype.len() != self.num_vars() {
            return Err(GenomeError::DimensionMismatch {
                expected: self.num_vars(),
                actual: phenotype.len(),
            });
        }

        let mut genotype = BitString::with_capacity(self.genotype_len());
        for (&value, bounds) in phenotype.iter().zip(&self.bounds) {
            genotype.extend_from(&self.codec.encode(value, bounds));
        }
        Ok(genotype)
    }

    /// Decode a genotype by slicing it at `bits_per_var` boundaries
    pub fn decode(&self, genotype: &BitString) -> Result<Vec<f64>, GenomeError> {
        if genotype.len() != self.genotype_len() {
            return Err(GenomeError::MalformedGenotype {
                expected: self.genotype_len(),
                actual: genotype.len(),
            });
        }

        genotype
            .fields(self.codec.bits_per_var())?
            .zip(&self.bounds)
            .map(|(field, bounds)| self.codec.decode(field, bounds))
            .collect()
    }

    /// Bounds whose extremes the codec cannot reach (values there saturate)
    pub fn saturating_dimensions(&self) -> Vec<usize> {
        let limit = self.codec.max_magnitude();
        self.bounds
            .iter()
            .enumerate()
            .filter(|(_, b)| b.max_magnitude() > limit)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn byte_codec() -> BitCodec {
        BitCodec::new(8, 4).unwrap()
    }

    fn wide() -> Bounds {
        Bounds::symmetric(1000.0)
    }

    #[test]
    fn test_codec_parameters() {
        let codec = byte_codec();
        assert_eq!(codec.bits_per_var(), 8);
        assert_eq!(codec.exponent_bits(), 4);
        assert_eq!(codec.mantissa_bits(), 3);
        assert_eq!(codec.bias(), 7);
        assert_eq!(
            codec.exponent_bits() + codec.mantissa_bits() + 1,
            codec.bits_per_var()
        );
    }

    #[test]
    fn test_codec_rejects_bad_widths() {
        assert!(BitCodec::new(8, 0).is_err());
        assert!(BitCodec::new(4, 4).is_err());
        assert!(BitCodec::new(16, 12).is_err());
        assert!(BitCodec::new(70, 5).is_err());
        assert!(BitCodec::new(5, 4).is_ok());
    }

    #[test]
    fn test_encode_one() {
        let bits = byte_codec().encode(1.0, &Bounds::symmetric(10.0));
        assert_eq!(bits.to_string(), "00111000");
    }

    #[test]
    fn test_decode_one() {
        let bits: BitString = "00111000".parse().unwrap();
        let value = byte_codec()
            .decode(bits.bits(), &Bounds::symmetric(10.0))
            .unwrap();
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_zero_is_all_zero_bits() {
        let codec = byte_codec();
        let bits = codec.encode(0.0, &wide());
        assert!(bits.is_all_zero());
        assert_eq!(codec.decode(bits.bits(), &wide()).unwrap(), 0.0);

        let negative_zero = codec.encode(-0.0, &wide());
        assert!(negative_zero.is_all_zero());
    }

    #[test]
    fn test_exact_values() {
        let codec = byte_codec();
        // -1.5 = -1 * 1.100b * 2^0
        assert_eq!(codec.encode(-1.5, &wide()).to_string(), "10111100");
        // 6.0 = 1.100b * 2^2
        assert_eq!(codec.encode(6.0, &wide()).to_string(), "01001100");
        // 0.25 = 1.000b * 2^-2
        assert_eq!(codec.encode(0.25, &wide()).to_string(), "00101000");
        for value in [-1.5, 6.0, 0.25, 3.75, -0.125] {
            let bits = codec.encode(value, &wide());
            assert_eq!(codec.decode(bits.bits(), &wide()).unwrap(), value);
        }
    }

    #[test]
    fn test_encode_clamps_into_bounds() {
        let codec = byte_codec();
        let bounds = Bounds::new(-2.0, 2.0);
        let bits = codec.encode(100.0, &bounds);
        assert_eq!(codec.decode(bits.bits(), &bounds).unwrap(), 2.0);
    }

    #[test]
    fn test_overflow_saturates_mantissa_bits() {
        let codec = byte_codec();
        // largest exponent is 15 - 7 = 8, so 1000.0 overflows
        let bits = codec.encode(1000.0, &wide());
        assert_eq!(bits.to_string(), "01111111");
        let negative = codec.encode(-1000.0, &wide());
        assert_eq!(negative.to_string(), "11111111");
        assert_eq!(
            codec.decode(bits.bits(), &wide()).unwrap(),
            codec.max_magnitude()
        );
        assert_eq!(codec.max_magnitude(), 1.875 * 256.0);
    }

    #[test]
    fn test_underflow_flushes_to_zero() {
        let codec = byte_codec();
        assert_eq!(codec.min_magnitude(), 1.125 / 128.0);
        for tiny in [1e-4, -1e-4, 1.0 / 256.0] {
            let bits = codec.encode(tiny, &wide());
            assert!(bits.is_all_zero(), "{} should flush to zero", tiny);
            assert_eq!(codec.decode(bits.bits(), &wide()).unwrap(), 0.0);
        }
        // 2^-bias collides with the zero pattern when positive
        assert!(codec.encode(1.0 / 128.0, &wide()).is_all_zero());
        assert_eq!(codec.encode(-1.0 / 128.0, &wide()).to_string(), "10000000");
    }

    #[test]
    fn test_min_magnitude_is_non_zero_for_both_signs() {
        for (bits, exponent) in [(8, 3), (8, 7), (16, 5), (32, 8)] {
            let codec = BitCodec::new(bits, exponent).unwrap();
            let smallest = codec.min_magnitude();
            assert!(!codec.encode(smallest, &wide()).is_all_zero());
            assert!(!codec.encode(-smallest, &wide()).is_all_zero());
        }
    }

    #[test]
    fn test_mantissa_rounding_carries_into_exponent() {
        let codec = byte_codec();
        // 1.97 rounds to mantissa 8/8, which carries to 2.0
        let bits = codec.encode(1.97, &wide());
        assert_eq!(bits.to_string(), "01000000");
        assert_eq!(codec.decode(bits.bits(), &wide()).unwrap(), 2.0);
    }

    #[test]
    fn test_carry_into_overflow_saturates() {
        let codec = byte_codec();
        // just under 2^9 rounds up past the top exponent
        let bits = codec.encode(509.0, &wide());
        assert_eq!(bits.to_string(), "01111111");
    }

    #[test]
    fn test_decode_clamps_corrupted_bits() {
        let codec = byte_codec();
        let bounds = Bounds::new(-3.0, 3.0);
        let huge: BitString = "01111111".parse().unwrap();
        assert_eq!(codec.decode(huge.bits(), &bounds).unwrap(), 3.0);
        let negative_huge: BitString = "11111111".parse().unwrap();
        assert_eq!(codec.decode(negative_huge.bits(), &bounds).unwrap(), -3.0);
    }

    #[test]
    fn test_decode_zero_pattern_clamped_into_bounds() {
        let codec = byte_codec();
        let bounds = Bounds::new(1.0, 5.0);
        let zero = BitString::zeros(8);
        assert_eq!(codec.decode(zero.bits(), &bounds).unwrap(), 1.0);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let codec = byte_codec();
        let err = codec.decode(&[true; 7], &wide()).unwrap_err();
        assert_eq!(
            err,
            GenomeError::MalformedGenotype {
                expected: 8,
                actual: 7
            }
        );
    }

    #[test]
    fn test_round_trip_relative_error() {
        let codec = BitCodec::new(16, 5).unwrap();
        let bounds = Bounds::symmetric(10.0);
        let tolerance = 2f64.powi(-(codec.mantissa_bits() as i32));
        let mut value = -10.0;
        while value <= 10.0 {
            let decoded = codec
                .decode(codec.encode(value, &bounds).bits(), &bounds)
                .unwrap();
            if value.abs() >= codec.min_magnitude() {
                assert_relative_eq!(decoded, value, max_relative = tolerance);
            }
            value += 0.0137;
        }
    }

    #[test]
    fn test_vector_codec_round_trip() {
        let codec = VectorCodec::new(
            BitCodec::new(16, 5).unwrap(),
            vec![(-10.0, 10.0), (0.0, 1.0), (-100.0, -1.0)]
                .into_iter()
                .collect(),
        );
        assert_eq!(codec.num_vars(), 3);
        assert_eq!(codec.genotype_len(), 48);

        let phenotype = vec![3.25, 0.5, -42.0];
        let genotype = codec.encode(&phenotype).unwrap();
        assert_eq!(genotype.len(), 48);
        assert_eq!(codec.decode(&genotype).unwrap(), phenotype);
    }

    #[test]
    fn test_vector_codec_errors() {
        let codec = VectorCodec::new(byte_codec(), MultiBounds::symmetric(10.0, 2));
        assert_eq!(
            codec.encode(&[1.0]).unwrap_err(),
            GenomeError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(
            codec.decode(&BitString::zeros(12)).unwrap_err(),
            GenomeError::MalformedGenotype {
                expected: 16,
                actual: 12
            }
        );
        assert!(codec.decode(&BitString::zeros(24)).is_err());
    }

    #[test]
    fn test_saturating_dimensions() {
        let codec = VectorCodec::new(
            byte_codec(),
            vec![(-10.0, 10.0), (-1000.0, 1.0)].into_iter().collect(),
        );
        assert_eq!(codec.saturating_dimensions(), vec![1]);
    }
}
