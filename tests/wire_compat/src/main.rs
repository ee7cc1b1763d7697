fn main() {
    println!("Run `cargo test -p mikroclaw-wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use mikroclaw_api_wire::{
        Sentence, WireError, decode_length, decode_sentence, encode_length, encode_sentence,
    };
    use mikroclaw_deploy::deploy_sentences;
    use mikroclaw_protocol::{Credentials, DeploymentArtifact};
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Fixture {
        length_prefixes: Vec<PrefixCase>,
        rejected_lengths: Vec<i64>,
        sentences: Vec<SentenceCase>,
        malformed: Vec<MalformedCase>,
        deploy: DeployCase,
    }

    #[derive(Deserialize)]
    struct PrefixCase {
        length: i64,
        hex: String,
    }

    #[derive(Deserialize)]
    struct SentenceCase {
        name: String,
        words: Vec<String>,
        hex: String,
    }

    #[derive(Deserialize)]
    struct MalformedCase {
        name: String,
        hex: String,
    }

    #[derive(Deserialize)]
    struct DeployCase {
        user: String,
        password: String,
        binary_url: String,
        config_json: String,
        /// Leading sentences of the deploy sequence.
        sentences: Vec<String>,
    }

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn load_fixture() -> Fixture {
        let path = fixtures_dir().join("api_frames.json");
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    fn bytes(hex_str: &str) -> Vec<u8> {
        hex::decode(hex_str).unwrap_or_else(|e| panic!("bad hex {hex_str}: {e}"))
    }

    // --- Length prefixes ---

    #[test]
    fn length_prefixes_match_fixture() {
        for case in load_fixture().length_prefixes {
            let encoded = encode_length(case.length).unwrap();
            assert_eq!(hex::encode(&encoded), case.hex, "length {}", case.length);

            let (decoded, width) = decode_length(&encoded).unwrap();
            assert_eq!(decoded as i64, case.length);
            assert_eq!(width, encoded.len());
        }
    }

    #[test]
    fn out_of_range_lengths_are_rejected() {
        for length in load_fixture().rejected_lengths {
            assert!(encode_length(length).is_err(), "length {length}");
        }
    }

    // --- Sentences ---

    #[test]
    fn sentences_encode_byte_exact() {
        for case in load_fixture().sentences {
            let encoded = encode_sentence(case.words.as_slice()).unwrap();
            assert_eq!(hex::encode(&encoded), case.hex, "sentence {}", case.name);

            let via_builder = Sentence::from_words(case.words.clone()).encode().unwrap();
            assert_eq!(via_builder, encoded, "builder {}", case.name);
        }
    }

    #[test]
    fn sentences_decode_to_words() {
        for case in load_fixture().sentences {
            let frame = bytes(&case.hex);
            let (words, consumed) = decode_sentence(&frame).unwrap();
            assert_eq!(words, case.words, "sentence {}", case.name);
            assert_eq!(consumed, frame.len());
        }
    }

    #[test]
    fn back_to_back_sentences_split_cleanly() {
        let fixture = load_fixture();
        let stream: Vec<u8> = fixture.sentences.iter().flat_map(|c| bytes(&c.hex)).collect();
        let mut pos = 0;
        for case in &fixture.sentences {
            let (words, consumed) = decode_sentence(&stream[pos..]).unwrap();
            assert_eq!(words, case.words, "sentence {}", case.name);
            pos += consumed;
        }
        assert_eq!(pos, stream.len());
    }

    #[test]
    fn malformed_frames_fail() {
        for case in load_fixture().malformed {
            let err = decode_sentence(&bytes(&case.hex)).unwrap_err();
            match case.name.as_str() {
                "four_byte_prefix" => assert!(matches!(err, WireError::UnsupportedPrefix(0xe0))),
                _ => assert!(matches!(err, WireError::Truncated), "{}: {err}", case.name),
            }
        }
    }

    // --- Deploy sequence ---

    #[test]
    fn deploy_sequence_starts_with_fixture_frames() {
        let case = load_fixture().deploy;
        let artifact = DeploymentArtifact::new(case.binary_url, case.config_json);
        let sentences = deploy_sentences(&Credentials::new(case.user, case.password), &artifact);
        assert_eq!(sentences.len(), 3);
        for (i, expected) in case.sentences.iter().enumerate() {
            let encoded = sentences[i].encode().unwrap();
            assert_eq!(&hex::encode(encoded), expected, "deploy sentence {i}");
        }
    }
}
