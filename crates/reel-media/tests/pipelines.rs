//! Pipeline behavior against a recording fake tool.

mod common;

use common::{arg_value, file_name, input_names, media, Fixture};
use reel_media::{
    change_speed, download_and_loop_audio, download_and_loop_video, join_audio, join_video, merge, normalize_audio,
    normalize_video, remove_black_bars, trim, CropDetectSettings, Crossfade, MediaError,
    MediaInfo, VideoLoopOptions,
};
use reel_models::Transition;

#[tokio::test]
async fn merge_joins_adjacent_pairs_in_input_order() {
    let fx = Fixture::new(MediaInfo::audio(10.0));
    let inputs = vec![fx.source("a.wav"), fx.source("b.wav"), fx.source("c.wav")];

    let out = merge(&fx.ctx, &inputs, &media("media/out.wav"), Crossfade::audio(2.0))
        .await
        .unwrap();
    assert_eq!(out.to_string(), "media/out.wav");

    let commands = fx.tool.commands();
    assert_eq!(commands.len(), 2);

    // a + b first, then (a + b) + c
    assert_eq!(input_names(&commands[0]), vec!["a.wav", "b.wav"]);
    let first_output = file_name(commands[0].output());
    assert_eq!(input_names(&commands[1]), vec![first_output, "c.wav".to_string()]);

    assert_eq!(fx.files(), vec!["a.wav", "b.wav", "c.wav", "out.wav"]);
}

#[tokio::test]
async fn merge_requires_two_inputs() {
    let fx = Fixture::new(MediaInfo::audio(10.0));
    let inputs = vec![fx.source("a.wav")];

    let err = merge(&fx.ctx, &inputs, &media("out.wav"), Crossfade::audio(2.0))
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(fx.tool.commands().is_empty());
}

#[tokio::test]
async fn audio_join_uses_asymmetric_curves() {
    let fx = Fixture::new(MediaInfo::audio(12.0));
    let a = fx.source("a.wav");
    let b = fx.source("b.wav");

    join_audio(&fx.ctx, &a, &b, &media("ab.wav"), 5.0).await.unwrap();

    let cmd = &fx.tool.commands()[0];
    assert_eq!(
        arg_value(cmd, "-filter_complex").unwrap(),
        "acrossfade=d=5:c1=exp:c2=log"
    );
}

#[tokio::test]
async fn video_join_anchors_transition_at_offset() {
    let fx = Fixture::new(MediaInfo::video(12.0, 1280, 720, 30.0));
    let a = fx.source("a.mp4");
    let b = fx.source("b.mp4");

    join_video(&fx.ctx, &a, &b, &media("ab.mp4"), 3.0, Transition::Dissolve)
        .await
        .unwrap();

    let cmd = &fx.tool.commands()[0];
    assert_eq!(
        arg_value(cmd, "-filter_complex").unwrap(),
        "[0:v][1:v]xfade=transition=dissolve:duration=3:offset=9.000[v]"
    );
    assert_eq!(arg_value(cmd, "-map").unwrap(), "[v]");
}

#[tokio::test]
async fn join_rejects_overlap_not_shorter_than_first_input() {
    let fx = Fixture::new(MediaInfo::audio(5.0));
    let a = fx.source("a.wav");
    let b = fx.source("b.wav");

    for overlap in [5.0, 6.0] {
        let err = join_audio(&fx.ctx, &a, &b, &media("ab.wav"), overlap)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Configuration(_)));
    }
    assert!(fx.tool.commands().is_empty());
}

#[tokio::test]
async fn normalize_audio_runs_three_joins_and_trims_to_target() {
    let fx = Fixture::new(MediaInfo::audio(12.0));
    let src = fx.source("loop.wav");

    let out = normalize_audio(&fx.ctx, &src, &media("media/bed.wav"), 25.0, 5.0)
        .await
        .unwrap();
    assert_eq!(out.to_string(), "media/bed.wav");

    let joins = fx.tool.commands_with("-filter_complex", "acrossfade=d=5");
    assert_eq!(joins.len(), 3);

    let trims: Vec<_> = fx
        .tool
        .commands()
        .into_iter()
        .filter(|c| arg_value(c, "-to").is_some())
        .collect();
    assert_eq!(trims.len(), 1);
    assert_eq!(arg_value(&trims[0], "-ss").unwrap(), "0.000");
    assert_eq!(arg_value(&trims[0], "-to").unwrap(), "25.000");
    assert_eq!(arg_value(&trims[0], "-c:a").unwrap(), "copy");
    assert!(arg_value(&trims[0], "-c:v").is_none());

    assert_eq!(fx.files(), vec!["bed.wav", "loop.wav"]);
}

#[tokio::test]
async fn normalize_audio_with_single_copy_only_trims() {
    let fx = Fixture::new(MediaInfo::audio(30.0));
    let src = fx.source("long.wav");

    normalize_audio(&fx.ctx, &src, &media("short.wav"), 10.0, 5.0)
        .await
        .unwrap();

    let commands = fx.tool.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(input_names(&commands[0]), vec!["long.wav"]);
    assert_eq!(fx.files(), vec!["long.wav", "short.wav"]);
}

#[tokio::test]
async fn normalize_audio_cleans_up_after_tool_failure() {
    let fx = Fixture::new(MediaInfo::audio(12.0));
    fx.tool.fail_on_run(1);
    let src = fx.source("loop.wav");

    let err = normalize_audio(&fx.ctx, &src, &media("bed.wav"), 25.0, 5.0)
        .await
        .unwrap_err();
    assert!(err.is_external_tool());

    assert_eq!(fx.files(), vec!["loop.wav"]);
}

#[tokio::test]
async fn normalize_audio_cleans_up_when_trim_fails() {
    let fx = Fixture::new(MediaInfo::audio(12.0));
    // three joins, then the trim
    fx.tool.fail_on_run(3);
    let src = fx.source("loop.wav");

    let err = normalize_audio(&fx.ctx, &src, &media("bed.wav"), 25.0, 5.0)
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::FfmpegFailed { .. }));
    assert_eq!(fx.files(), vec!["loop.wav"]);
}

#[tokio::test]
async fn normalize_audio_rejects_source_shorter_than_overlap() {
    let fx = Fixture::new(MediaInfo::audio(4.0));
    let src = fx.source("blip.wav");

    let err = normalize_audio(&fx.ctx, &src, &media("bed.wav"), 25.0, 5.0)
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(fx.tool.commands().is_empty());
    assert_eq!(fx.files(), vec!["blip.wav"]);
}

#[tokio::test]
async fn normalize_video_loops_tracks_separately_and_muxes() {
    let fx = Fixture::new(MediaInfo::video(10.0, 1920, 1080, 30.0));
    let src = fx.source("clip.mp4");

    let options = VideoLoopOptions::new(20.0)
        .with_crossfade(3.0)
        .with_audio_crossfade(2.0);
    normalize_video(&fx.ctx, &src, &media("media/long.mp4"), &options)
        .await
        .unwrap();

    // 7s per visual copy -> 3 copies -> 2 xfade joins
    assert_eq!(fx.tool.commands_with("-filter_complex", "xfade=").len(), 2);
    // 8s per audio copy -> 3 copies -> 2 acrossfade joins
    assert_eq!(fx.tool.commands_with("-filter_complex", "acrossfade=d=2").len(), 2);

    let extract = fx.tool.commands_with("-acodec", "pcm_s16le");
    assert_eq!(extract.len(), 1);
    assert_eq!(input_names(&extract[0]), vec!["clip.mp4"]);

    let mux = fx.tool.commands_with("-itsoffset", "0.000");
    assert_eq!(mux.len(), 1);
    assert_eq!(arg_value(&mux[0], "-c:a").unwrap(), "aac");
    assert_eq!(arg_value(&mux[0], "-c:v").unwrap(), "copy");

    assert_eq!(fx.files(), vec!["clip.mp4", "long.mp4"]);
}

#[tokio::test]
async fn normalize_video_cleans_up_after_tool_failure() {
    // Runs: 0-1 xfade joins, 2 video trim, 3 extract, 4-5 acrossfade joins,
    // 6 audio trim, 7 mux
    for failing_run in [1, 3, 4, 6, 7] {
        let fx = Fixture::new(MediaInfo::video(10.0, 1920, 1080, 30.0));
        fx.tool.fail_on_run(failing_run);
        let src = fx.source("clip.mp4");

        let err = normalize_video(&fx.ctx, &src, &media("long.mp4"), &VideoLoopOptions::new(20.0))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::FfmpegFailed { .. }), "run {}", failing_run);
        assert_eq!(fx.tool.commands().len(), failing_run + 1);
        assert_eq!(fx.files(), vec!["clip.mp4"], "run {}", failing_run);
    }
}

#[tokio::test]
async fn trim_reencodes_video_with_fast_seek() {
    let fx = Fixture::new(MediaInfo::video(60.0, 1280, 720, 30.0));
    let src = fx.source("talk.mp4");

    trim(&fx.ctx, &src, &media("cut.mp4"), 5.0, 15.5, false)
        .await
        .unwrap();

    let args = fx.tool.commands()[0].build_args();
    let ss = args.iter().position(|a| a == "-ss").unwrap();
    let to = args.iter().position(|a| a == "-to").unwrap();
    let input = args.iter().position(|a| a == "-i").unwrap();
    assert!(ss < input && to < input);
    assert_eq!(args[to + 1], "15.500");
    assert!(args.contains(&"libx264".to_string()));
}

#[tokio::test]
async fn remove_black_bars_crops_with_last_detected_rectangle() {
    let fx = Fixture::new(MediaInfo::video(10.0, 1920, 1080, 25.0));
    fx.tool.set_stderr(
        "[Parsed_cropdetect_0] crop=1920:800:0:140\n[Parsed_cropdetect_0] crop=1920:816:0:132\n",
    );
    let src = fx.source("film.mp4");

    remove_black_bars(&fx.ctx, &src, &media("film-cropped.mp4"), CropDetectSettings::default())
        .await
        .unwrap();

    let commands = fx.tool.commands();
    assert_eq!(commands.len(), 2);
    assert!(commands[0].is_null_output());
    assert_eq!(
        arg_value(&commands[0], "-vf").unwrap(),
        "cropdetect=limit=24:round=16:reset=0"
    );
    assert_eq!(arg_value(&commands[0], "-v").unwrap(), "info");
    assert_eq!(arg_value(&commands[1], "-vf").unwrap(), "crop=1920:816:0:132");
    assert_eq!(arg_value(&commands[1], "-c:a").unwrap(), "copy");

    assert_eq!(fx.files(), vec!["film-cropped.mp4", "film.mp4"]);
}

#[tokio::test]
async fn remove_black_bars_fails_without_detection() {
    let fx = Fixture::new(MediaInfo::video(10.0, 1920, 1080, 25.0));
    fx.tool.set_stderr("frame=250 fps=0.0\n");
    let src = fx.source("film.mp4");

    let err = remove_black_bars(&fx.ctx, &src, &media("out.mp4"), CropDetectSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::CropNotDetected(_)));
    assert_eq!(fx.tool.commands().len(), 1);
    assert_eq!(fx.files(), vec!["film.mp4"]);
}

#[tokio::test]
async fn change_speed_pairs_setpts_with_inverse_tempo_chain() {
    let fx = Fixture::new(MediaInfo::video(10.0, 1280, 720, 30.0));
    let src = fx.source("clip.mp4");

    change_speed(&fx.ctx, &src, &media("slow.mp4"), 250.0).await.unwrap();

    let cmd = &fx.tool.commands()[0];
    assert_eq!(arg_value(cmd, "-filter:v").unwrap(), "setpts=250*PTS");
    let chain = arg_value(cmd, "-filter:a").unwrap();
    assert!(chain.starts_with("atempo=0.5,atempo=0.5"));
    let product: f64 = chain
        .split(',')
        .map(|stage| stage.trim_start_matches("atempo=").parse::<f64>().unwrap())
        .product();
    assert!((product - 1.0 / 250.0).abs() < 1e-12);
}

#[tokio::test]
async fn change_speed_rejects_non_positive_factor() {
    let fx = Fixture::new(MediaInfo::video(10.0, 1280, 720, 30.0));
    let src = fx.source("clip.mp4");

    let err = change_speed(&fx.ctx, &src, &media("x.mp4"), 0.0).await.unwrap_err();
    assert!(err.is_configuration());
    assert!(fx.tool.commands().is_empty());
}

#[tokio::test]
async fn download_and_loop_audio_leaves_only_destination() {
    let fx = Fixture::new(MediaInfo::video(12.0, 1280, 720, 30.0));

    let out = download_and_loop_audio(&fx.ctx, "https://example.com/v", &media("media/bgm.wav"), 25.0)
        .await
        .unwrap();

    assert_eq!(out.to_string(), "media/bgm.wav");
    assert_eq!(fx.tool.downloads(), vec!["https://example.com/v"]);
    assert_eq!(fx.files(), vec!["bgm.wav"]);
    assert!(fx.path("bgm.wav").exists());
}

#[tokio::test]
async fn download_and_loop_video_upscales_and_leaves_only_destination() {
    let fx = Fixture::new(MediaInfo::video(10.0, 1280, 720, 30.0));
    let options = VideoLoopOptions::new(20.0);

    let out = download_and_loop_video(
        &fx.ctx,
        "https://example.com/v",
        &media("media/long.mp4"),
        &options,
        Some(60),
    )
    .await
    .unwrap();

    assert_eq!(out.to_string(), "media/long.mp4");
    assert_eq!(fx.tool.downloads(), vec!["https://example.com/v"]);

    let upscale = fx.tool.commands_with("-filter:v", "minterpolate");
    assert_eq!(upscale.len(), 1);
    assert_eq!(arg_value(&upscale[0], "-r").unwrap(), "60");
    assert_eq!(fx.tool.commands().last().unwrap().build_args(), upscale[0].build_args());

    assert_eq!(fx.files(), vec!["long.mp4"]);
}

#[tokio::test]
async fn download_and_loop_video_without_upscale_skips_interpolation() {
    let fx = Fixture::new(MediaInfo::video(10.0, 1280, 720, 30.0));

    let options = VideoLoopOptions::new(20.0);
    download_and_loop_video(&fx.ctx, "https://example.com/v", &media("long.mp4"), &options, None)
        .await
        .unwrap();

    assert!(fx.tool.commands_with("-filter:v", "minterpolate").is_empty());
    assert_eq!(fx.files(), vec!["long.mp4"]);
}

#[tokio::test]
async fn download_and_loop_video_cleans_up_when_upscale_fails() {
    let fx = Fixture::new(MediaInfo::video(10.0, 1280, 720, 30.0));
    // eight loop runs, then the interpolation
    fx.tool.fail_on_run(8);

    let options = VideoLoopOptions::new(20.0);
    let err = download_and_loop_video(&fx.ctx, "https://example.com/v", &media("long.mp4"), &options, Some(60))
        .await
        .unwrap_err();

    assert!(err.is_external_tool());
    assert!(fx.files().is_empty());
}
