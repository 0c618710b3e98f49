use std::sync::Arc;

use lectern_core::testing::{
    oversized_video, sample_video, RecordingNotifier, StubEndpoint, StubProbe,
};
use lectern_core::{AuthoringConfig, AuthoringSession, MediaFile, RejectReason, Severity};

fn build_session(probe: Arc<StubProbe>) -> (AuthoringSession, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let session = AuthoringSession::builder(AuthoringConfig::default())
        .with_probe(probe)
        .with_notifier(notifier.clone())
        .with_endpoint(Arc::new(StubEndpoint::new()))
        .build()
        .expect("session should build");
    (session, notifier)
}

fn staged_names(session: &AuthoringSession) -> Vec<String> {
    session
        .registry()
        .assets()
        .iter()
        .map(|asset| asset.file().file_name.clone())
        .collect()
}

#[tokio::test]
async fn intake_rejects_non_videos_and_oversized_files_with_toasts() {
    let (mut session, notifier) = build_session(Arc::new(StubProbe::fixed(0)));
    let report = session.add_videos(vec![
        sample_video("intro.mp4"),
        MediaFile::new("notes.pdf", "application/pdf", vec![0u8; 128]),
        oversized_video("raw-footage.mp4", 501),
    ]);

    assert_eq!(report.added.len(), 1);
    assert_eq!(report.rejected.len(), 2);
    assert_eq!(report.rejected[0].file_name, "notes.pdf");
    assert_eq!(report.rejected[0].reason, RejectReason::NotVideo);
    assert_eq!(report.rejected[1].file_name, "raw-footage.mp4");
    assert_eq!(report.rejected[1].reason, RejectReason::TooLarge);
    assert_eq!(session.registry().len(), 1);

    let errors = notifier.messages(Severity::Error);
    assert_eq!(
        errors,
        vec![
            "notes.pdf is not a video file".to_string(),
            "raw-footage.mp4 is larger than the 500 MB limit".to_string(),
        ]
    );
}

#[tokio::test]
async fn intake_caps_the_course_at_twenty_videos() {
    let (mut session, notifier) = build_session(Arc::new(StubProbe::fixed(0)));
    let files: Vec<_> = (0..23)
        .map(|i| sample_video(&format!("part-{i:02}.mp4")))
        .collect();
    let report = session.add_videos(files);

    assert_eq!(report.added.len(), 20);
    assert_eq!(report.rejected.len(), 3);
    assert!(report
        .rejected
        .iter()
        .all(|rejected| rejected.reason == RejectReason::CapacityReached));
    assert_eq!(session.registry().len(), 20);

    // one toast for the whole batch, not one per overflow file
    assert_eq!(
        notifier.messages(Severity::Error),
        vec!["you can add up to 20 videos per course".to_string()]
    );
}

#[tokio::test]
async fn probes_fill_durations_per_file_and_unknowns_stay_zero() {
    let probe = Arc::new(StubProbe::fixed(0));
    probe.set("a.mp4", 45);
    probe.set("b.mp4", 150);
    let (mut session, _) = build_session(probe);
    let report = session.add_videos(vec![
        sample_video("a.mp4"),
        sample_video("b.mp4"),
        sample_video("broken.mp4"),
    ]);
    assert_eq!(session.total_duration_secs(), 0);

    session.settle_probes().await;
    let registry = session.registry();
    assert_eq!(registry.get(report.added[0]).unwrap().duration_secs(), 45);
    assert_eq!(registry.get(report.added[1]).unwrap().duration_secs(), 150);
    assert_eq!(registry.get(report.added[2]).unwrap().duration_secs(), 0);
    assert_eq!(session.total_duration_secs(), 195);
    assert_eq!(session.registry().pending_probes(), 0);
}

#[tokio::test]
async fn reorder_moves_one_video_and_keeps_the_rest_stable() {
    let (mut session, _) = build_session(Arc::new(StubProbe::fixed(0)));
    session.add_videos(vec![
        sample_video("a.mp4"),
        sample_video("b.mp4"),
        sample_video("c.mp4"),
        sample_video("d.mp4"),
    ]);

    assert!(session.reorder_videos(0, 2));
    assert_eq!(staged_names(&session), vec!["b.mp4", "c.mp4", "a.mp4", "d.mp4"]);

    assert!(!session.reorder_videos(0, 4));
    assert_eq!(staged_names(&session), vec!["b.mp4", "c.mp4", "a.mp4", "d.mp4"]);
}

#[tokio::test]
async fn reorder_matches_the_remove_insert_model_for_every_pair() {
    for from in 0..4 {
        for to in 0..4 {
            let (mut session, _) = build_session(Arc::new(StubProbe::fixed(0)));
            session.add_videos(vec![
                sample_video("a.mp4"),
                sample_video("b.mp4"),
                sample_video("c.mp4"),
                sample_video("d.mp4"),
            ]);
            let mut model = staged_names(&session);
            let moved = model.remove(from);
            model.insert(to, moved);

            assert!(session.reorder_videos(from, to));
            assert_eq!(staged_names(&session), model, "from={from} to={to}");
        }
    }
}

#[tokio::test]
async fn asset_ids_stay_pinned_to_their_videos_across_reorder() {
    let (mut session, _) = build_session(Arc::new(StubProbe::fixed(0)));
    let report = session.add_videos(vec![
        sample_video("a.mp4"),
        sample_video("b.mp4"),
        sample_video("c.mp4"),
    ]);
    let b = report.added[1];
    assert!(session.select_video(b));

    assert!(session.reorder_videos(1, 0));
    let registry = session.registry();
    assert_eq!(registry.get(b).unwrap().file().file_name, "b.mp4");
    assert_eq!(registry.position_of(b), Some(0));
    assert_eq!(registry.selected_id(), Some(b));
    assert_eq!(registry.selected_index(), Some(0));
}

#[tokio::test]
async fn removing_the_selected_video_advances_the_selection() {
    let (mut session, _) = build_session(Arc::new(StubProbe::fixed(0)));
    let report = session.add_videos(vec![
        sample_video("a.mp4"),
        sample_video("b.mp4"),
        sample_video("c.mp4"),
    ]);
    let (a, b, c) = (report.added[0], report.added[1], report.added[2]);

    assert!(session.select_video(b));
    assert!(session.remove_video(b));
    assert_eq!(session.registry().selected_id(), Some(c));

    assert!(session.remove_video(c));
    assert_eq!(session.registry().selected_id(), Some(a));

    assert!(session.remove_video(a));
    assert_eq!(session.registry().selected_id(), None);
}
