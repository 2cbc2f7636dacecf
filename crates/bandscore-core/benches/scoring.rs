use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bandscore_core::band::band_for_score;
use bandscore_core::feedback::parse_feedback;
use bandscore_core::model::{AnswerSet, SpeakingTask, SubjectiveTask};
use bandscore_core::scorer::score_answers;

fn make_sets(n: usize) -> (AnswerSet, AnswerSet) {
    let correct: AnswerSet = (1..=n)
        .map(|i| (i.to_string(), format!("Answer {i}")))
        .collect();
    let answers: AnswerSet = (1..=n)
        .map(|i| {
            let given = if i % 3 == 0 {
                "wrong".to_string()
            } else {
                format!("  answer {i} ")
            };
            (i.to_string(), given)
        })
        .collect();
    (answers, correct)
}

fn bench_score_answers(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_answers");

    for n in [13usize, 40, 400] {
        let (answers, correct) = make_sets(n);
        group.bench_function(format!("questions={n}"), |b| {
            b.iter(|| score_answers(black_box(&answers), black_box(&correct)))
        });
    }

    group.finish();
}

fn bench_band_for_score(c: &mut Criterion) {
    c.bench_function("band_for_score/all_of_40", |b| {
        b.iter(|| {
            for score in 0..=40u32 {
                black_box(band_for_score(black_box(score), black_box(40)).ok());
            }
        })
    });
}

fn bench_parse_feedback(c: &mut Criterion) {
    let task = SubjectiveTask::Speaking(SpeakingTask {
        part_number: 2,
        question: "Describe a place you like to visit.".into(),
        transcript: "I really enjoy visiting the old harbour in my city.".into(),
        duration_secs: 110,
    });
    let reply = r#"```json
{
  "band_score": 6.5,
  "fluency_coherence": 7,
  "pronunciation": 6,
  "lexical_resource": 6.5,
  "grammatical_range": 6,
  "detailed_feedback": {"pronunciation": "Some unclear vowel sounds."},
  "strengths": ["Speaks at length", "Good range of topic vocabulary"],
  "improvements": ["Word stress", "Complex sentences"],
  "suggestions": ["Shadow native speakers", "Practise Part 2 with a timer"]
}
```"#;

    c.bench_function("parse_feedback/speaking_fenced", |b| {
        b.iter(|| parse_feedback(black_box(&task), black_box(reply)))
    });
}

criterion_group!(
    benches,
    bench_score_answers,
    bench_band_for_score,
    bench_parse_feedback
);
criterion_main!(benches);
