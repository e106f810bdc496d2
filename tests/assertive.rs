//! Rewrite table behavior, no models involved.

use assertive_rewriter::assertive::{transform_to_assertive, Emotion, Rewrite};

#[test]
fn known_emotions_replace_any_sentence() {
    let cases = [
        ("anger", "I understand this happened and will address it constructively."),
        ("sadness", "I acknowledge the results and will take steps to improve."),
        ("joy", "This is a great moment, and I appreciate it."),
        ("neutral", "I acknowledge this event and will proceed accordingly."),
    ];

    for (label, expected) in cases {
        for sentence in ["I am so angry about the delay", "ok", "   "] {
            assert_eq!(transform_to_assertive(label, sentence), expected, "{label}");
        }
    }
}

#[test]
fn angry_sentence_becomes_constructive() {
    assert_eq!(
        transform_to_assertive("anger", "I am so angry about the delay"),
        "I understand this happened and will address it constructively."
    );
}

#[test]
fn joyful_sentence_becomes_appreciative() {
    assert_eq!(
        transform_to_assertive("joy", "I am thrilled about the results"),
        "This is a great moment, and I appreciate it."
    );
}

#[test]
fn surprise_passes_through() {
    assert_eq!(
        transform_to_assertive("surprise", "It is raining outside"),
        "It is raining outside"
    );
}

#[test]
fn emotions_without_templates_pass_through() {
    for emotion in [Emotion::Disgust, Emotion::Fear, Emotion::Surprise] {
        let sentence = "The report is due tomorrow";
        assert_eq!(transform_to_assertive(emotion.label(), sentence), sentence);
    }
}

#[test]
fn labels_are_case_sensitive() {
    let sentence = "I am so angry about the delay";
    assert_eq!(transform_to_assertive("ANGER", sentence), sentence);
    assert_eq!(transform_to_assertive("Joy", sentence), sentence);
    assert_eq!(Rewrite::for_label("Neutral"), Rewrite::PassThrough);
}

#[test]
fn unknown_label_passes_through() {
    assert_eq!(transform_to_assertive("boredom", "meh"), "meh");
    assert_eq!(transform_to_assertive("", "meh"), "meh");
}
