use anyhow::Result;
use rollout_core::RunnerConfig;
use rollout_eval::{run, EvalConfig};
use rollout_pendulum_env::{PendulumEnvConfig, RenderConfig};
use rollout_policy_no_backend::{GaussianMlpParams, GaussianMlpPolicy};
use std::path::Path;
use tempdir::TempDir;

fn save_policy(dir: &Path, input_dim: usize, step: usize) -> Result<()> {
    let params = GaussianMlpParams::init(input_dim, &[16], 1, -1.0, step as u64)?;
    GaussianMlpPolicy::new(params)?.save(dir, step)?;
    Ok(())
}

fn config(root: &Path) -> EvalConfig {
    let env = PendulumEnvConfig::default()
        .max_episode_steps(10)
        .render(Some(RenderConfig {
            height: 24,
            width: 32,
        }));
    EvalConfig::default()
        .ckpt_dir(root.join("ckpt"))
        .env(env)
        .episodes(2)
        .runner(RunnerConfig::default().seed(7))
}

#[test]
fn test_eval_writes_videos_and_report() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new("rollout_eval")?;
    let root = dir.path();
    save_policy(&root.join("ckpt"), 3, 100)?;
    save_policy(&root.join("ckpt"), 3, 200)?;

    let report = root.join("report.csv");
    let config = config(root)
        .render(true)
        .video_out(root.join("videos/ep_{:03}.gif").to_string_lossy().to_string())
        .report_csv(Some(report.clone()));
    let summary = run(&config)?;

    assert_eq!(summary.len(), 2);
    assert!(summary.results().iter().all(|r| r.length == 10));
    assert!(summary.returns().iter().all(|r| *r <= 0.0));
    assert!(root.join("videos/ep_000.gif").is_file());
    assert!(root.join("videos/ep_001.gif").is_file());

    let text = std::fs::read_to_string(&report)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "episode,return,length");
    assert!(lines[1].starts_with("0,") && lines[1].ends_with(",10"));
    Ok(())
}

#[test]
fn test_eval_is_reproducible() -> Result<()> {
    let dir = TempDir::new("rollout_eval")?;
    let root = dir.path();
    save_policy(&root.join("ckpt"), 3, 100)?;

    let s1 = run(&config(root))?;
    let s2 = run(&config(root))?;
    assert_eq!(s1, s2);
    Ok(())
}

#[test]
fn test_missing_checkpoint_fails_before_any_episode() -> Result<()> {
    let dir = TempDir::new("rollout_eval")?;
    let root = dir.path();
    std::fs::create_dir_all(root.join("ckpt"))?;
    let report = root.join("report.csv");
    let config = config(root)
        .render(true)
        .video_out(root.join("videos/ep_{:03}.gif").to_string_lossy().to_string())
        .report_csv(Some(report.clone()));

    assert!(run(&config).is_err());
    assert!(run(&config.clone().step(Some(5))).is_err());
    assert!(!report.exists());
    assert!(!root.join("videos").exists());
    Ok(())
}

#[test]
fn test_frame_stack_changes_input_dim() -> Result<()> {
    let dir = TempDir::new("rollout_eval")?;
    let root = dir.path();
    save_policy(&root.join("ckpt"), 3, 100)?;
    let config = config(root).frame_stack(Some(2));
    assert!(run(&config).is_err());

    save_policy(&root.join("ckpt"), 6, 200)?;
    let summary = run(&config)?;
    assert_eq!(summary.len(), 2);
    Ok(())
}
