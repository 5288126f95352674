//! Synthetic resources shared by the integration tests.

use gptbpe_core::ByteCodec;
use gptbpe_tokenizer::{Tokenizer, Variant};
use serde_json::{Map, Value};

/// Merge rules over the byte symbols; each result has a vocabulary entry.
pub const MERGES: &str = "#version: 0.2
Ġ t
h e
Ġt he
i n
Ġ a
Ġ s
o n
Ġ w
e r
Ġa n
Ġan d
Ġw i
Ġwi th
";

/// Vocabulary JSON: the 256 byte symbols (id = byte value), then one token per
/// merge rule in rule order.
pub fn vocab_json() -> String {
    let codec = ByteCodec::new();
    let mut map = Map::new();
    for b in 0u8..=255 {
        map.insert(codec.to_symbol(b).to_string(), Value::from(b as u32));
    }

    let merged = MERGES.lines().skip(1).map(|line| line.replace(' ', ""));
    for (i, token) in merged.enumerate() {
        map.insert(token, Value::from(256 + i as u32));
    }

    Value::Object(map).to_string()
}

pub fn tokenizer(variant: Variant) -> Tokenizer {
    Tokenizer::builder()
        .variant(variant)
        .build_from_strs(&vocab_json(), MERGES)
        .unwrap()
}

/// Texts mixing words, code indentation, digits and multi-byte characters.
pub const CORPUS: &[&str] = &[
    "",
    " ",
    "\t",
    "the cat sat on the mat",
    "This is some text",
    "indivisible and in theory within",
    "def main():\n    print('hello world')\n\n        return 42",
    "some_code toString some_more_code",
    "hello 👋 world 🌍",
    "Ünïcödé, 日本語, and ελληνικά",
    "trailing whitespace   \n\n",
    "1234567890 3.14159 -273.15",
];
