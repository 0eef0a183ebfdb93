//! Round-trip properties of the word, character and instruction codecs.

use carddeck::instruction::OPCODES;
use carddeck::{
    FieldPolicy, Repertoire, Sign, Word, assemble, char_to_code, char_to_punch, code_to_char,
    disassemble, punch_to_char,
};
use proptest::prelude::*;

fn sign() -> impl Strategy<Value = Sign> {
    prop_oneof![Just(Sign::Plus), Just(Sign::Minus)]
}

fn repertoire_char() -> impl Strategy<Value = char> {
    prop::sample::select(Repertoire::chars().collect::<Vec<_>>())
}

proptest! {
    #[test]
    fn signed_form_parses_back(magnitude in 0u64..10_000_000_000, sign in sign()) {
        let word = Word::new(magnitude, sign).unwrap();
        let parsed = Word::parse_numeric(&word.format_signed(), FieldPolicy::Strict).unwrap();
        prop_assert_eq!(parsed, word);
        prop_assert_eq!(parsed.is_negative_zero(), magnitude == 0 && sign == Sign::Minus);
    }

    #[test]
    fn instructions_disassemble_to_their_fields(
        idx in 0..OPCODES.len(),
        data_addr in 0u32..10_000,
        instr_addr in 0u32..10_000,
        sign in sign(),
    ) {
        let entry = &OPCODES[idx];
        let word = assemble(entry.name, data_addr, instr_addr, sign).unwrap();
        let dis = disassemble(word);
        prop_assert_eq!(dis.mnemonic.name(), Some(entry.name));
        prop_assert_eq!(u32::from(dis.data_addr), data_addr);
        prop_assert_eq!(u32::from(dis.instr_addr), instr_addr);
        prop_assert_eq!(dis.sign, sign);
    }

    #[test]
    fn printable_ascii_survives_the_punch_table(byte in 0x20u8..=0x7E) {
        let ch = char::from(byte);
        prop_assert_eq!(punch_to_char(char_to_punch(ch)).unwrap(), ch);
    }

    #[test]
    fn repertoire_survives_two_digit_codes(ch in repertoire_char()) {
        prop_assert_eq!(code_to_char(char_to_code(ch)), ch);
    }

    #[test]
    fn five_characters_pack_into_one_word(text in prop::collection::vec(repertoire_char(), 5)) {
        let text: String = text.into_iter().collect();
        prop_assert_eq!(Word::from_text(&text).to_text(), text);
    }

    #[test]
    fn peeled_digits_recompose(magnitude in 0u64..10_000_000_000, n in 1u32..=9) {
        let scale = 10u64.pow(n);
        let mut lead = Word::new(magnitude, Sign::Minus).unwrap();
        let group = lead.take_leading_digits(n);
        prop_assert_eq!(
            u64::from(group) * (10_000_000_000 / scale) + lead.magnitude() / scale,
            magnitude
        );
        prop_assert_eq!(lead.sign(), Sign::Minus);

        let mut trail = Word::new(magnitude, Sign::Plus).unwrap();
        let group = trail.take_trailing_digits(n);
        prop_assert_eq!(trail.magnitude() * scale + u64::from(group), magnitude);
    }
}
