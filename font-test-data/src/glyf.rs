//! glyf entries

use font_types::F2Dot14;

use crate::bebuffer::BeBuffer;

/// A 500x700 rectangle, with every coordinate stored as a long delta.
#[rustfmt::skip]
pub static RECTANGLE: &[u8] = &[
    0x00, 0x01,             // numberOfContours 1
    0x00, 0x00, 0x00, 0x00, // xMin 0, yMin 0
    0x01, 0xF4, 0x02, 0xBC, // xMax 500, yMax 700
    0x00, 0x03,             // endPtsOfContours [3]
    0x00, 0x00,             // instructionLength 0
    0x01, 0x01, 0x01, 0x01, // flags: on curve, long x, long y
    0x00, 0x00, 0x01, 0xF4, 0x00, 0x00, 0xFE, 0x0C, // x: 0, +500, 0, -500
    0x00, 0x00, 0x00, 0x00, 0x02, 0xBC, 0x00, 0x00, // y: 0, 0, +700, 0
];

/// Points (50,0) on, (50,100) off, (150,100) off, (150,0) on, using short
/// and same-as-previous deltas.
#[rustfmt::skip]
pub static ARCH: &[u8] = &[
    0x00, 0x01,             // numberOfContours 1
    0x00, 0x32, 0x00, 0x00, // xMin 50, yMin 0
    0x00, 0x96, 0x00, 0x64, // xMax 150, yMax 100
    0x00, 0x03,             // endPtsOfContours [3]
    0x00, 0x00,             // instructionLength 0
    0x33,                   // on, x short +, y same
    0x34,                   // off, x same, y short +
    0x32,                   // off, x short +, y same
    0x15,                   // on, x same, y short -
    0x32, 0x64,             // x: +50, +100
    0x64, 0x64,             // y: +100, -100
];

/// Two 100 unit squares with two bytes of instructions.
#[rustfmt::skip]
pub static TWO_SQUARES: &[u8] = &[
    0x00, 0x02,             // numberOfContours 2
    0x00, 0x00, 0x00, 0x00, // xMin 0, yMin 0
    0x01, 0x2C, 0x00, 0x64, // xMax 300, yMax 100
    0x00, 0x03, 0x00, 0x07, // endPtsOfContours [3, 7]
    0x00, 0x02, 0xB0, 0x01, // instructionLength 2, PUSHB[0] 1
    0x31,                   // on, x same, y same        (0,0)
    0x33,                   // on, x short +, y same     (100,0)
    0x35,                   // on, x same, y short +     (100,100)
    0x23,                   // on, x short -, y same     (0,100)
    0x17,                   // on, x short +, y short -  (200,0)
    0x33,                   // on, x short +, y same     (300,0)
    0x35,                   // on, x same, y short +     (300,100)
    0x23,                   // on, x short -, y same     (200,100)
    0x64, 0x64, 0xC8, 0x64, 0x64, // x
    0x64, 0x64, 0x64,             // y
];

/// Four on-curve points along the x axis; the last three flags are stored
/// once with a REPEAT count.
#[rustfmt::skip]
pub static REPEATED_FLAGS: &[u8] = &[
    0x00, 0x01,             // numberOfContours 1
    0x00, 0x00, 0x00, 0x00, // xMin 0, yMin 0
    0x01, 0x2C, 0x00, 0x00, // xMax 300, yMax 0
    0x00, 0x03,             // endPtsOfContours [3]
    0x00, 0x00,             // instructionLength 0
    0x31,                   // on, x same, y same
    0x3B, 0x02,             // on, x short +, y same, REPEAT 2
    0x64, 0x64, 0x64,       // x: +100, +100, +100
];

/// A composite placing glyph 1 at the origin and glyph 2 so that its point
/// 0 lands on point 2 of the already placed glyph 1.
#[rustfmt::skip]
pub static MATCHED_POINTS_COMPOSITE: &[u8] = &[
    0xFF, 0xFF,             // numberOfContours -1
    0x00, 0x00, 0x00, 0x00, // xMin 0, yMin 0
    0x02, 0x58, 0x03, 0x20, // xMax 600, yMax 800
    0x00, 0x22,             // ARGS_ARE_XY_VALUES | MORE_COMPONENTS
    0x00, 0x01,             // glyph 1
    0x00, 0x00,             // dx 0, dy 0 (bytes)
    0x00, 0x00,             // matched points, byte args
    0x00, 0x02,             // glyph 2
    0x02, 0x00,             // host point 2, component point 0
];

/// A composite with a word offset and a uniform scale.
pub fn scaled_composite(glyph: u16, dx: i16, dy: i16, scale: f32) -> Vec<u8> {
    BeBuffer::new()
        .push(-1i16)
        .extend([0i16, 0, 0, 0])
        // ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES | WE_HAVE_A_SCALE
        .push(0x000Bu16)
        .push(glyph)
        .push(dx)
        .push(dy)
        .push(F2Dot14::from_f32(scale))
        .into_vec()
}

/// A composite placing `glyph` twice, the second copy moved right by `dx`.
pub fn doubled_composite(glyph: u16, dx: i16) -> Vec<u8> {
    BeBuffer::new()
        .push(-1i16)
        .extend([0i16, 0, 0, 0])
        // ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES | MORE_COMPONENTS
        .push(0x0023u16)
        .push(glyph)
        .extend([0i16, 0])
        // ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES
        .push(0x0003u16)
        .push(glyph)
        .extend([dx, 0])
        .into_vec()
}

/// A composite with a single component that refers to itself.
pub fn self_referencing_composite(glyph: u16) -> Vec<u8> {
    BeBuffer::new()
        .push(-1i16)
        .extend([0i16, 0, 0, 0])
        .push(0x0002u16)
        .push(glyph)
        .extend([0u8, 0])
        .into_vec()
}

/// A composite whose matched-point anchor points past the host's points.
pub fn bad_anchor_composite(component: u16, host_point: u8) -> Vec<u8> {
    BeBuffer::new()
        .push(-1i16)
        .extend([0i16, 0, 0, 0])
        .push(0x0000u16)
        .push(component)
        .extend([host_point, 0])
        .into_vec()
}
