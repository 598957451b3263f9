use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["retailintel-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(cli.seed.is_none());
}

#[test]
fn parses_brands_without_search() {
    let cli = Cli::try_parse_from(["retailintel-cli", "brands"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Brands { search: None })
    ));
}

#[test]
fn parses_brands_with_search() {
    let cli = Cli::try_parse_from(["retailintel-cli", "brands", "--search", "mason"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Brands { search: Some(ref s) }) if s == "mason"
    ));
}

#[test]
fn parses_overview_with_brand() {
    let cli =
        Cli::try_parse_from(["retailintel-cli", "overview", "--brand", "Suit Supply"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Overview { brand: Some(ref b) }) if b == "Suit Supply"
    ));
}

#[test]
fn parses_compare() {
    let cli = Cli::try_parse_from(["retailintel-cli", "compare"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Compare)));
}

#[test]
fn drilldown_requires_category() {
    assert!(Cli::try_parse_from(["retailintel-cli", "drilldown"]).is_err());

    let cli =
        Cli::try_parse_from(["retailintel-cli", "drilldown", "--category", "Polos"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Drilldown { ref category }) if category == "Polos"
    ));
}

#[test]
fn analyze_defaults_to_live_run() {
    let cli =
        Cli::try_parse_from(["retailintel-cli", "analyze", "--brand", "buck-mason"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze { ref brand, dry_run: false }) if brand == "buck-mason"
    ));
}

#[test]
fn analyze_brand_and_dry_run_together() {
    let cli = Cli::try_parse_from([
        "retailintel-cli",
        "analyze",
        "--brand",
        "Ralph Lauren",
        "--dry-run",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze { ref brand, dry_run: true }) if brand == "Ralph Lauren"
    ));
}

#[test]
fn seed_is_accepted_after_subcommand() {
    let cli = Cli::try_parse_from(["retailintel-cli", "compare", "--seed", "7"]).unwrap();
    assert_eq!(cli.seed, Some(7));
}

#[test]
fn parses_categories() {
    let cli = Cli::try_parse_from(["retailintel-cli", "categories"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Categories)));
}

#[test]
fn same_seed_synthesizes_same_records() {
    let brands = BrandsFile {
        brands: vec![retailintel_core::BrandSeed {
            name: "Buck Mason".to_string(),
            url: "https://www.buckmason.com/".to_string(),
            logo: None,
            notes: None,
        }],
    };
    let a = retailintel_core::seed_records(&mut StdRng::seed_from_u64(3), &brands.brands);
    let b = retailintel_core::seed_records(&mut StdRng::seed_from_u64(3), &brands.brands);
    assert_eq!(a[0].data, b[0].data);
    assert_eq!(a[0].total_styles, b[0].total_styles);
}
