// ==========================================
// 児童福祉加算判定・収益シミュレーション - CLI 入口
// ==========================================
// 用法: addition-sim --help
// 说明:
// - 指定 --db 时经 FacilityApi 读写 SQLite（目录 / 事业所 / 职员 / 配置）
// - --persist 使用默认数据库路径（ADDITION_SIM_DB_PATH 或用户数据目录）
// - 数据库模式下 --catalog / --roster 的内容写入库后再判定
// - 未指定目录来源时使用内置标准目录
// ==========================================

use anyhow::Result;
use chrono::NaiveDate;
use clap::builder::PossibleValuesParser;
use clap::Parser;
use welfare_addition_engine::config::EngineConfig;
use welfare_addition_engine::db::default_db_path;
use welfare_addition_engine::domain::{
    AdditionCatalog, FacilitySettings, JudgmentReport, SimulationParams, SimulationResult,
    StaffMember,
};
use welfare_addition_engine::i18n::{
    format_number, set_locale, t, t_with_args, SUPPORTED_LOCALES,
};
use welfare_addition_engine::importer::{
    standard_catalog, CatalogLoader, RosterImportOutcome, RosterImporter,
};
use welfare_addition_engine::{logging, AdditionApi, ApiError, FacilityApi};

#[derive(Parser, Debug)]
#[command(name = "addition-sim")]
#[command(about = "児童福祉加算の判定と収益シミュレーション")]
#[command(version)]
struct CliArgs {
    /// SQLite 数据库路径
    #[arg(long, conflicts_with = "persist")]
    db: Option<String>,

    /// 使用默认数据库路径
    #[arg(long)]
    persist: bool,

    /// 加算目录 JSON
    #[arg(long)]
    catalog: Option<String>,

    /// 职员名册（.csv / .xlsx / .xls）
    #[arg(long)]
    roster: Option<String>,

    /// 事业所 ID
    #[arg(long, default_value = "default")]
    facility: String,

    /// 参照日 YYYY-MM-DD（省略时为当天）
    #[arg(long)]
    date: Option<NaiveDate>,

    /// 利用儿童数
    #[arg(long)]
    children: Option<i64>,

    /// 平均利用日数
    #[arg(long)]
    days: Option<f64>,

    /// 基本报酬单位数
    #[arg(long)]
    base_units: Option<f64>,

    /// 地域区分
    #[arg(long)]
    region: Option<i64>,

    /// 率加算合计（%）
    #[arg(long)]
    percent: Option<f64>,

    /// 以 JSON 输出
    #[arg(long)]
    json: bool,

    /// 输出语言（覆盖库内配置）
    #[arg(long, value_parser = PossibleValuesParser::new(SUPPORTED_LOCALES.iter().copied()))]
    locale: Option<String>,
}

impl CliArgs {
    fn db_path(&self) -> Option<String> {
        match (&self.db, self.persist) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(default_db_path().to_string_lossy().into_owned()),
            (None, false) => None,
        }
    }
}

/// 运行所需的全部输入（判定前已解析完毕）
struct Inputs {
    config: EngineConfig,
    catalog: AdditionCatalog,
    settings: FacilitySettings,
    staff: Vec<StaffMember>,
}

fn print_violations(outcome: &RosterImportOutcome) {
    for violation in &outcome.violations {
        eprintln!(
            "[{:?}] row {} {}: {}",
            violation.level, violation.row_number, violation.field, violation.message
        );
    }
}

fn load_from_db(args: &CliArgs, db_path: &str) -> Result<Inputs> {
    tracing::info!(db_path = %db_path, "使用 SQLite 数据库");
    let api = FacilityApi::open(db_path)?;
    let config = api.engine_config()?;

    let catalog = match &args.catalog {
        Some(path) => api.import_catalog_file(path)?,
        None => api.ensure_catalog()?,
    };

    let settings = match api.facility(&args.facility) {
        Ok(settings) => settings,
        Err(ApiError::NotFound(_)) => FacilitySettings {
            facility_id: args.facility.clone(),
            ..Default::default()
        },
        Err(e) => return Err(e.into()),
    };

    if let Some(path) = &args.roster {
        print_violations(&api.import_roster(&args.facility, path)?);
    }
    let staff = api.staff(&args.facility)?;

    Ok(Inputs {
        config,
        catalog,
        settings,
        staff,
    })
}

fn load_from_files(args: &CliArgs) -> Result<Inputs> {
    let catalog = match &args.catalog {
        Some(path) => CatalogLoader::from_file(path)?,
        None => standard_catalog(),
    };

    let staff = match &args.roster {
        Some(path) => {
            let outcome = RosterImporter::new().import_file(path)?;
            print_violations(&outcome);
            outcome.staff
        }
        None => Vec::new(),
    };

    Ok(Inputs {
        config: EngineConfig::default(),
        catalog,
        settings: FacilitySettings {
            facility_id: args.facility.clone(),
            ..Default::default()
        },
        staff,
    })
}

fn load_inputs(args: &CliArgs) -> Result<Inputs> {
    let mut inputs = match args.db_path() {
        Some(db_path) => load_from_db(args, &db_path)?,
        None => load_from_files(args)?,
    };
    if let Some(locale) = &args.locale {
        inputs.config.locale = locale.clone();
    }
    Ok(inputs)
}

fn build_params(args: &CliArgs, settings: &FacilitySettings) -> SimulationParams {
    let defaults = SimulationParams::from_settings(settings, 0.0);
    SimulationParams {
        child_count: args.children.unwrap_or(defaults.child_count),
        average_usage_days: args.days.unwrap_or(defaults.average_usage_days),
        base_units: args.base_units.unwrap_or(defaults.base_units),
        region_grade: args.region.unwrap_or(defaults.region_grade),
        percent_additions: args.percent.unwrap_or(defaults.percent_additions),
    }
}

fn print_report(report: &JudgmentReport, simulation: &SimulationResult) {
    let date = report.reference_date.to_string();
    println!("{}", t_with_args("cli.header_judgment", &[("date", &date)]));
    for (group, members) in report.grouped() {
        if let Some(group) = group {
            println!("  [{}]", group);
        }
        for result in members {
            let status = if result.is_selected {
                t("cli.selected")
            } else if result.is_eligible {
                t("cli.eligible")
            } else {
                t("cli.ineligible")
            };
            println!("    {:<6} {} - {}", status, result.name, result.reason);
        }
    }

    let rounded = simulation.rounded();
    println!();
    println!("{}", t("cli.header_simulation"));
    for (key, value) in [
        ("cli.base", rounded.base),
        ("cli.system_addition", rounded.system_addition),
        ("cli.percent_addition", rounded.percent_addition),
        ("cli.implementation", rounded.implementation),
        ("cli.total", rounded.total_revenue),
        ("cli.per_child", rounded.per_child_revenue),
    ] {
        println!("    {:<12} {:>12}", t(key), value);
    }

    println!();
    println!("{}", t("cli.header_suggestions"));
    if simulation.suggestions.is_empty() {
        println!("    {}", t("cli.no_suggestions"));
    }
    for suggestion in &simulation.suggestions {
        println!(
            "    [{}] {} ({} {})",
            suggestion.priority.as_str(),
            suggestion.description,
            t("cli.impact"),
            format_number(suggestion.estimated_impact.round())
        );
    }

    if !report.anomalies.is_empty() {
        println!();
        println!("{}", t("cli.anomalies"));
        for anomaly in &report.anomalies {
            println!("    {}", anomaly);
        }
    }
}

fn main() -> Result<()> {
    logging::init();
    let args = CliArgs::parse();

    let inputs = load_inputs(&args)?;
    set_locale(&inputs.config.locale);

    let params = build_params(&args, &inputs.settings);
    let api = AdditionApi::new(inputs.config);

    let output = api.run_pipeline(
        &inputs.staff,
        &inputs.settings,
        &inputs.catalog,
        args.date,
        &params,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&output.report, &output.simulation);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_parse() {
        let args = CliArgs::try_parse_from([
            "addition-sim",
            "--date",
            "2024-06-01",
            "--children",
            "12",
            "--percent",
            "13.1",
            "--locale",
            "en",
        ])
        .unwrap();
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(args.children, Some(12));
        assert_eq!(args.percent, Some(13.1));
        assert_eq!(args.facility, "default");
        assert_eq!(args.db_path(), None);
    }

    #[test]
    fn test_cli_args_reject_bad_values() {
        assert!(CliArgs::try_parse_from(["addition-sim", "--date", "2024/06/01"]).is_err());
        assert!(CliArgs::try_parse_from(["addition-sim", "--locale", "fr"]).is_err());
        assert!(CliArgs::try_parse_from(["addition-sim", "--children", "many"]).is_err());
        assert!(
            CliArgs::try_parse_from(["addition-sim", "--db", "a.db", "--persist"]).is_err()
        );
    }

    #[test]
    fn test_locale_flag_overrides_default() {
        let args = CliArgs::try_parse_from(["addition-sim", "--locale", "en"]).unwrap();
        let inputs = load_inputs(&args).unwrap();
        assert_eq!(inputs.config.locale, "en");
        assert_eq!(inputs.settings.facility_id, "default");
        assert!(inputs.staff.is_empty());
    }
}
