use clap::{Arg, ArgAction, Command, value_parser};
use pursuitsim::batch::{BatchRun, BatchRunner, MonteCarloResult};
use pursuitsim::logging::{LogConfig, LogOutput, init_logging, level_for_verbosity, parse_log_level};
use pursuitsim::metrics::EngagementMetrics;
use pursuitsim::scenario::ScenarioConfig;
use pursuitsim::simulation::SimulationEngine;

fn main() {
    // コマンドライン引数の解析
    let matches = Command::new("pursuitsim")
        .version("0.1.0")
        .about("追跡機・ターゲット交戦シミュレーション (Pursuit Simulation)")
        .long_about("誘導則と位置・姿勢制御ループによる迎撃シミュレーション\n\
                     純追尾と比例航法の比較、パラメータスイープ、モンテカルロ評価を行います。")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
        )
        .arg(
            Arg::new("guidance")
                .short('g')
                .long("guidance")
                .value_name("LAW")
                .help("誘導則を上書き (pure_pursuit | proportional_navigation)")
        )
        .arg(
            Arg::new("monte-carlo")
                .short('m')
                .long("monte-carlo")
                .value_name("RUNS")
                .value_parser(value_parser!(u32))
                .help("シード値を変えて指定回数のモンテカルロ評価を実行")
                .conflicts_with_all(["info", "sweep"])
        )
        .arg(
            Arg::new("sweep")
                .long("sweep")
                .action(ArgAction::SetTrue)
                .help("ゲイン・ノイズ・最大加速度・外乱のパラメータスイープを実行")
                .conflicts_with("info")
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("バッチ実行のワーカースレッド数")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("OUTPUT")
                .default_value("console")
                .help("ログ出力先 (console, file, both)")
        )
        .get_matches();

    println!("交戦シミュレーション (Pursuit Simulation) - pursuitsim v0.1.0");
    println!();

    let verbose_level = matches.get_count("verbose");

    // ログ初期化
    let output = match matches.get_one::<String>("log-output").map(|s| s.parse::<LogOutput>()) {
        Some(Ok(output)) => output,
        Some(Err(e)) => {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
        None => LogOutput::Console,
    };
    let level = matches
        .get_one::<String>("log-level")
        .map(|s| parse_log_level(s))
        .unwrap_or_else(|| level_for_verbosity(verbose_level));
    let _log_guard = match init_logging(LogConfig { level, output, ..LogConfig::default() }) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("エラー: ログ初期化に失敗しました: {}", e);
            std::process::exit(1);
        }
    };

    let Some(scenario_path) = matches.get_one::<String>("scenario") else {
        show_default_help();
        return;
    };

    let options = RunOptions {
        info_only: matches.get_flag("info"),
        guidance: matches.get_one::<String>("guidance").cloned(),
        monte_carlo_runs: matches.get_one::<u32>("monte-carlo").copied(),
        sweep: matches.get_flag("sweep"),
        threads: matches.get_one::<usize>("threads").copied(),
        verbose_level,
    };

    match run_scenario(scenario_path, &options) {
        Ok(_) => {
            if verbose_level > 0 {
                println!("シナリオ実行が正常に完了しました。");
            }
        }
        Err(e) => {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
    }
}

struct RunOptions {
    info_only: bool,
    guidance: Option<String>,
    monte_carlo_runs: Option<u32>,
    sweep: bool,
    threads: Option<usize>,
    verbose_level: u8,
}

/// シナリオファイルを読み込んで実行
fn run_scenario(scenario_path: &str, options: &RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = ScenarioConfig::from_file(scenario_path)?;
    if let Some(law) = &options.guidance {
        scenario = scenario.with_guidance(law)?;
    }

    if options.verbose_level > 0 {
        println!("シナリオファイル読み込み完了: {}", scenario_path);
    }

    scenario.print_summary();
    println!();

    if options.info_only {
        return Ok(());
    }

    if let Some(runs) = options.monte_carlo_runs {
        let runner = BatchRunner::new(options.threads, options.verbose_level)?;
        let result = runner.monte_carlo(&scenario, runs)?;
        print_monte_carlo(&result);
    } else if options.sweep {
        let runner = BatchRunner::new(options.threads, options.verbose_level)?;
        let runs = runner.sweep(&scenario)?;
        print_sweep(&runs);
    } else {
        let mut engine = SimulationEngine::new(&scenario, options.verbose_level)?;
        let report = engine.run()?;
        println!("=== 交戦結果 ({}) ===", report.guidance);
        print_metrics(&report.metrics);
    }

    Ok(())
}

fn format_optional_time(value: Option<f64>) -> String {
    value.map_or_else(|| "なし".to_string(), |t| format!("{:.2}秒", t))
}

fn print_metrics(metrics: &EngagementMetrics) {
    println!("最小相対距離: {:.3}m", metrics.miss_distance);
    println!("最終相対距離: {:.3}m", metrics.final_miss_distance);
    println!("捕捉時刻: {}", format_optional_time(metrics.time_to_intercept));
    println!("整定時刻: {}", format_optional_time(metrics.settling_time));
    println!("制御エネルギー: {:.2}", metrics.energy);
}

fn print_sweep(runs: &[BatchRun]) {
    println!("=== パラメータスイープ結果 ===");
    println!("{:<28} {:>10} {:>10} {:>10} {:>10} {:>10}", "ケース", "最小距離", "捕捉", "整定", "エネルギー", "実行時間");
    for run in runs {
        let m = &run.metrics;
        println!(
            "{:<28} {:>10.3} {:>10} {:>10} {:>10.2} {:>8.1}ms",
            run.label,
            m.miss_distance,
            format_optional_time(m.time_to_intercept),
            format_optional_time(m.settling_time),
            m.energy,
            run.elapsed.as_secs_f64() * 1000.0
        );
    }
}

fn print_monte_carlo(result: &MonteCarloResult) {
    let s = &result.summary;
    println!("=== モンテカルロ評価結果 ({}回) ===", s.count);
    println!(
        "最小相対距離: 平均 {:.3}m, 標準偏差 {:.3}m, 最小 {:.3}m, 最大 {:.3}m",
        s.miss_distance.mean, s.miss_distance.std_dev, s.miss_distance.min, s.miss_distance.max
    );
    println!(
        "制御エネルギー: 平均 {:.2}, 標準偏差 {:.2}, 最小 {:.2}, 最大 {:.2}",
        s.energy.mean, s.energy.std_dev, s.energy.min, s.energy.max
    );
    println!("捕捉回数: {}/{} ({:.1}%)", s.intercept_count, s.count, s.intercept_rate() * 100.0);
}

/// デフォルトヘルプとシナリオ一覧を表示
fn show_default_help() {
    println!("使用方法:");
    println!("  pursuitsim [オプション]");
    println!();
    println!("オプション:");
    println!("  -s, --scenario <FILE>     シナリオファイルを指定して実行");
    println!("  -i, --info                シナリオ情報のみ表示");
    println!("  -g, --guidance <LAW>      誘導則を上書き (pure_pursuit, proportional_navigation)");
    println!("  -m, --monte-carlo <RUNS>  モンテカルロ評価");
    println!("      --sweep               パラメータスイープ");
    println!("  -v, --verbose             詳細出力 (複数指定で詳細レベル上昇)");
    println!("      --log-level <LEVEL>   ログレベル");
    println!("      --log-output <OUTPUT> ログ出力先 (console, file, both)");
    println!("  -h, --help                このヘルプを表示");
    println!();
    println!("利用可能なシナリオファイル:");
    println!("  scenarios/helix_pure_pursuit.yaml             - らせんターゲット・純追尾");
    println!("  scenarios/helix_proportional_navigation.yaml  - らせんターゲット・比例航法");
    println!("  scenarios/arc_target_attitude.yaml            - 旋回ターゲット・姿勢ループ有効");
    println!("  scenarios/monte_carlo_noise.yaml              - ノイズ・外乱ありの評価用");
    println!();
    println!("例:");
    println!("  pursuitsim -s scenarios/helix_pure_pursuit.yaml");
    println!("  pursuitsim -s scenarios/helix_pure_pursuit.yaml -g proportional_navigation -v");
    println!("  pursuitsim -s scenarios/monte_carlo_noise.yaml -m 100");
    println!("  pursuitsim -s scenarios/helix_pure_pursuit.yaml --sweep");
}
