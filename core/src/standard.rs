//! The standard basis/dimension/unit catalog (§4.12's scope defaults).
//!
//! Grounded on `examples/original_source/ucon/bases.py` (SI/CGS/CGS-ESU
//! basis component order and the SI→CGS/CGS-ESU transform matrices),
//! `ucon/dimension.py` (the ~30 named dimension vectors reproduced below,
//! in the SI basis order `time, length, mass, current, temperature,
//! luminous_intensity, amount_of_substance, information` — SPEC_FULL.md §9
//! resolves `information`, not `angle`, as the 8th SI component), and
//! `ucon/graph.py`'s `_build_standard_graph()` (the concrete conversion
//! factors and cross-structure shortcut edges, reproduced in
//! `conversion_graph()` below).
//!
//! `bases.py`'s own `CGS_ESU_TO_SI = SI_TO_CGS_ESU.embedding()` would raise
//! at import time: the SI current row of `SI_TO_CGS_ESU` has three nonzero
//! entries, not the single-`1` shape `embedding()` requires. This module
//! does not reproduce that call; `si_to_cgs_esu_constant_aware()` instead
//! wraps the same (non-square) matrix in a `ConstantAwareBasisTransform`,
//! the construct SPEC_FULL.md §4.3 names for exactly this situation.

use std::f64::consts::PI;

use crate::basis::{Basis, BasisComponent, Vector};
use crate::basis_graph::BasisGraph;
use crate::dimension::{Dimension, DimensionRegistry, PseudoTag};
use crate::graph::ConversionGraph;
use crate::num::map::Map;
use crate::num::rational;
use crate::num::scale::Scale;
use crate::num::unit::{Unit, UnitFactor, UnitProduct};
use crate::transform::{BasisTransform, ConstantAwareBasisTransform, ConstantBinding};

const SI_COMPONENTS: usize = 8;
// Indices into the SI basis's component vector.
const TIME: usize = 0;
const LENGTH: usize = 1;
const MASS: usize = 2;
const CURRENT: usize = 3;
const TEMPERATURE: usize = 4;
const LUMINOUS_INTENSITY: usize = 5;
const AMOUNT_OF_SUBSTANCE: usize = 6;
const INFORMATION: usize = 7;

fn build_si_basis() -> Basis {
    Basis::new(
        "SI",
        vec![
            BasisComponent::new("time", Some("T")),
            BasisComponent::new("length", Some("L")),
            BasisComponent::new("mass", Some("M")),
            BasisComponent::new("current", Some("I")),
            BasisComponent::new("temperature", Some("\u{398}")),
            BasisComponent::new("luminous_intensity", Some("J")),
            BasisComponent::new("amount_of_substance", Some("N")),
            BasisComponent::new("information", Some("B")),
        ],
    )
    .expect("SI basis component names/symbols are unique")
}

fn build_cgs_basis() -> Basis {
    Basis::new(
        "CGS",
        vec![
            BasisComponent::new("length", Some("L")),
            BasisComponent::new("mass", Some("M")),
            BasisComponent::new("time", Some("T")),
        ],
    )
    .expect("CGS basis component names/symbols are unique")
}

fn build_cgs_esu_basis() -> Basis {
    Basis::new(
        "CGS-ESU",
        vec![
            BasisComponent::new("length", Some("L")),
            BasisComponent::new("mass", Some("M")),
            BasisComponent::new("time", Some("T")),
            BasisComponent::new("charge", Some("Q")),
        ],
    )
    .expect("CGS-ESU basis component names/symbols are unique")
}

thread_local! {
    // Cached per thread so every call returns the *same* `Basis` allocation
    // (`Basis::is_same_basis` is pointer identity) — `BasisTransform::apply`
    // and `Vector`'s same-basis checks would otherwise reject a vector built
    // from one `si_basis()` call against a transform built from another.
    static SI_BASIS: Basis = build_si_basis();
    static CGS_BASIS: Basis = build_cgs_basis();
    static CGS_ESU_BASIS: Basis = build_cgs_esu_basis();
}

pub fn si_basis() -> Basis {
    SI_BASIS.with(Basis::clone)
}

pub fn cgs_basis() -> Basis {
    CGS_BASIS.with(Basis::clone)
}

pub fn cgs_esu_basis() -> Basis {
    CGS_ESU_BASIS.with(Basis::clone)
}

fn si_vec(basis: &Basis, components: [(i64, i64); SI_COMPONENTS]) -> Vector {
    Vector::new(
        basis,
        components
            .iter()
            .map(|(n, d)| rational::ratio(*n, *d))
            .collect(),
    )
    .expect("component count matches SI basis length")
}

/// SI→CGS: a clean projection dropping current, temperature,
/// luminous_intensity, amount_of_substance, and information (`bases.py`'s
/// `SI_TO_CGS`, reordered length/mass/time-first for its 3-component CGS
/// target).
pub fn si_to_cgs_transform() -> BasisTransform {
    let source = si_basis();
    let target = cgs_basis();
    let mut matrix = vec![vec![rational::zero(); target.len()]; source.len()];
    matrix[TIME][2] = rational::one();
    matrix[LENGTH][0] = rational::one();
    matrix[MASS][1] = rational::one();
    BasisTransform::new(source, target, matrix).expect("matrix shape matches source/target")
}

pub fn cgs_to_si_transform() -> BasisTransform {
    si_to_cgs_transform()
        .embedding()
        .expect("SI_TO_CGS is a clean projection by construction")
}

/// SI→CGS-ESU: length/mass/time embed directly; current embeds as
/// `length^(3/2) * mass^(1/2) * time^-2` (`bases.py`'s `SI_TO_CGS_ESU`,
/// whose current row is not a clean projection).
pub fn si_to_cgs_esu_transform() -> BasisTransform {
    let source = si_basis();
    let target = cgs_esu_basis();
    let mut matrix = vec![vec![rational::zero(); target.len()]; source.len()];
    matrix[TIME][2] = rational::one();
    matrix[LENGTH][0] = rational::one();
    matrix[MASS][1] = rational::one();
    matrix[CURRENT][0] = rational::ratio(3, 2);
    matrix[CURRENT][1] = rational::ratio(1, 2);
    matrix[CURRENT][2] = rational::int(-2);
    BasisTransform::new(source, target, matrix).expect("matrix shape matches source/target")
}

/// The `ConstantAwareBasisTransform` wrapping [`si_to_cgs_esu_transform`]:
/// a binding for `current` records that its CGS-ESU image is an opaque
/// multiple (symbol `"k_e"`, the Coulomb constant) of the ESU charge
/// component, letting `ConstantAwareBasisTransform::inverse` fill in the
/// column `BasisTransform::inverse` can't (the forward matrix isn't
/// square) and `BasisTransform::embedding` won't (the current row isn't a
/// clean projection) (§4.3).
pub fn si_to_cgs_esu_constant_aware() -> ConstantAwareBasisTransform {
    let inner = si_to_cgs_esu_transform();
    let target_expression = Vector::new(
        &cgs_esu_basis(),
        vec![
            rational::zero(),
            rational::zero(),
            rational::zero(),
            rational::one(),
        ],
    )
    .expect("four components for the CGS-ESU basis");
    let binding = ConstantBinding {
        source_component: "current".to_string(),
        target_expression,
        constant_symbol: "k_e".to_string(),
        exponent: rational::one(),
    };
    ConstantAwareBasisTransform::new(inner, vec![binding])
}

/// SI plus the CGS transform registered as an edge (§4.12's default basis
/// graph). CGS-ESU is reachable forward-only, matching its non-invertible
/// plain-matrix form; round-tripping it requires
/// [`si_to_cgs_esu_constant_aware`] directly.
pub fn basis_graph() -> BasisGraph {
    let mut graph = BasisGraph::new();
    graph.add_transform_pair(si_to_cgs_transform(), cgs_to_si_transform());
    graph.add_transform(si_to_cgs_esu_transform());
    graph
}

/// The named dimensions built over the SI basis (§4.5, ~30 of
/// `dimension.py`'s catalog).
pub struct StandardDimensions {
    pub time: Dimension,
    pub length: Dimension,
    pub mass: Dimension,
    pub current: Dimension,
    pub temperature: Dimension,
    pub luminous_intensity: Dimension,
    pub amount_of_substance: Dimension,
    pub information: Dimension,
    pub area: Dimension,
    pub volume: Dimension,
    pub velocity: Dimension,
    pub acceleration: Dimension,
    pub force: Dimension,
    pub pressure: Dimension,
    pub energy: Dimension,
    pub power: Dimension,
    pub charge: Dimension,
    pub voltage: Dimension,
    pub resistance: Dimension,
    pub capacitance: Dimension,
    pub inductance: Dimension,
    pub conductance: Dimension,
    pub magnetic_flux: Dimension,
    pub magnetic_flux_density: Dimension,
    pub frequency: Dimension,
    pub dynamic_viscosity: Dimension,
    pub kinematic_viscosity: Dimension,
    pub illuminance: Dimension,
    pub catalytic_activity: Dimension,
    pub concentration: Dimension,
    pub data_rate: Dimension,
    pub angle: Dimension,
    pub solid_angle: Dimension,
    pub ratio: Dimension,
    pub count: Dimension,
}

pub fn dimensions() -> StandardDimensions {
    let b = si_basis();
    let named = |components, name: &str, symbol: &str| {
        Dimension::named(si_vec(&b, components), name, Some(symbol))
    };
    StandardDimensions {
        time: named([(1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "time", "T"),
        length: named([(0, 1), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "length", "L"),
        mass: named([(0, 1), (0, 1), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "mass", "M"),
        current: named([(0, 1), (0, 1), (0, 1), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "current", "I"),
        temperature: named([(0, 1), (0, 1), (0, 1), (0, 1), (1, 1), (0, 1), (0, 1), (0, 1)], "temperature", "\u{398}"),
        luminous_intensity: named([(0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (1, 1), (0, 1), (0, 1)], "luminous_intensity", "J"),
        amount_of_substance: named([(0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (1, 1), (0, 1)], "amount_of_substance", "N"),
        information: named([(0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (1, 1)], "information", "B"),
        area: named([(0, 1), (2, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "area", "L^2"),
        volume: named([(0, 1), (3, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "volume", "L^3"),
        velocity: named([(-1, 1), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "velocity", "L/T"),
        acceleration: named([(-2, 1), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "acceleration", "L/T^2"),
        force: named([(-2, 1), (1, 1), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "force", "N"),
        pressure: named([(-2, 1), (-1, 1), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "pressure", "Pa"),
        energy: named([(-2, 1), (2, 1), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "energy", "J"),
        power: named([(-3, 1), (2, 1), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "power", "W"),
        charge: named([(1, 1), (0, 1), (0, 1), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "charge", "C"),
        voltage: named([(-3, 1), (2, 1), (1, 1), (-1, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "voltage", "V"),
        resistance: named([(-3, 1), (2, 1), (1, 1), (-2, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "resistance", "\u{3a9}"),
        capacitance: named([(4, 1), (-2, 1), (-1, 1), (2, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "capacitance", "F"),
        inductance: named([(-2, 1), (2, 1), (1, 1), (-2, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "inductance", "H"),
        conductance: named([(3, 1), (-2, 1), (-1, 1), (2, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "conductance", "S"),
        magnetic_flux: named([(-2, 1), (2, 1), (1, 1), (-1, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "magnetic_flux", "Wb"),
        magnetic_flux_density: named([(-2, 1), (0, 1), (1, 1), (-1, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "magnetic_flux_density", "T"),
        frequency: named([(-1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "frequency", "Hz"),
        dynamic_viscosity: named([(-1, 1), (-1, 1), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "dynamic_viscosity", "Pa\u{b7}s"),
        kinematic_viscosity: named([(-1, 1), (2, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)], "kinematic_viscosity", "St"),
        illuminance: named([(0, 1), (-2, 1), (0, 1), (0, 1), (0, 1), (1, 1), (0, 1), (0, 1)], "illuminance", "lx"),
        catalytic_activity: named([(-1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (1, 1), (0, 1)], "catalytic_activity", "kat"),
        concentration: named([(0, 1), (-3, 1), (0, 1), (0, 1), (0, 1), (0, 1), (1, 1), (0, 1)], "concentration", "mol/m^3"),
        data_rate: named([(-1, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1), (1, 1)], "data_rate", "bit/s"),
        angle: Dimension::pseudo(PseudoTag::Angle, &b, "angle", "rad"),
        solid_angle: Dimension::pseudo(PseudoTag::SolidAngle, &b, "solid_angle", "sr"),
        ratio: Dimension::pseudo(PseudoTag::Ratio, &b, "ratio", ""),
        count: Dimension::pseudo(PseudoTag::Count, &b, "count", "ea"),
    }
}

pub fn dimension_registry() -> DimensionRegistry {
    let dims = dimensions();
    let mut registry = DimensionRegistry::new();
    registry.register(dims.time);
    registry.register(dims.length);
    registry.register(dims.mass);
    registry.register(dims.current);
    registry.register(dims.temperature);
    registry.register(dims.luminous_intensity);
    registry.register(dims.amount_of_substance);
    registry.register(dims.information);
    registry.register(dims.area);
    registry.register(dims.volume);
    registry.register(dims.velocity);
    registry.register(dims.acceleration);
    registry.register(dims.force);
    registry.register(dims.pressure);
    registry.register(dims.energy);
    registry.register(dims.power);
    registry.register(dims.charge);
    registry.register(dims.voltage);
    registry.register(dims.resistance);
    registry.register(dims.capacitance);
    registry.register(dims.inductance);
    registry.register(dims.conductance);
    registry.register(dims.magnetic_flux);
    registry.register(dims.magnetic_flux_density);
    registry.register(dims.frequency);
    registry.register(dims.dynamic_viscosity);
    registry.register(dims.kinematic_viscosity);
    registry.register(dims.illuminance);
    registry.register(dims.catalytic_activity);
    registry.register(dims.concentration);
    registry.register(dims.data_rate);
    registry.register(dims.angle);
    registry.register(dims.solid_angle);
    registry.register(dims.ratio);
    registry.register(dims.count);
    registry
}

fn unit(name: &str, aliases: &[&str], dim: Dimension) -> Unit {
    Unit::new(name, aliases.iter().map(|a| a.to_string()).collect(), dim)
}

fn product(u: &Unit, exponent: i64) -> UnitProduct {
    UnitProduct::single(UnitFactor::new(u.clone(), Scale::ONE), rational::int(exponent))
}

/// Registers the default unit catalog and the ~30 conversion edges from
/// `ucon/graph.py`'s `_build_standard_graph()`, plus the supplemented
/// dBm/pH/count edges named in SPEC_FULL.md §4.9.
pub fn conversion_graph() -> ConversionGraph {
    let dims = dimensions();
    let mut graph = ConversionGraph::new();

    // --- Length ---
    let meter = unit("meter", &["m"], dims.length.clone());
    let foot = unit("foot", &["ft"], dims.length.clone());
    let mile = unit("mile", &["mi"], dims.length.clone());
    let inch = unit("inch", &["in"], dims.length.clone());
    let yard = unit("yard", &["yd"], dims.length.clone());
    let nautical_mile = unit("nautical_mile", &["nmi"], dims.length.clone());
    graph.add_unit_edge(&foot, &meter, Map::linear(0.3048)).unwrap();
    graph.add_unit_edge(&mile, &meter, Map::linear(1609.344)).unwrap();
    graph.add_unit_edge(&inch, &meter, Map::linear(0.0254)).unwrap();
    graph.add_unit_edge(&yard, &meter, Map::linear(0.9144)).unwrap();
    graph.add_unit_edge(&nautical_mile, &meter, Map::linear(1852.0)).unwrap();

    // --- Mass ---
    let kilogram = unit("kilogram", &["kg"], dims.mass.clone());
    let pound = unit("pound", &["lb"], dims.mass.clone());
    let ounce = unit("ounce", &["oz"], dims.mass.clone());
    let slug = unit("slug", &["slug"], dims.mass.clone());
    graph.add_unit_edge(&pound, &kilogram, Map::linear(0.45359237)).unwrap();
    graph.add_unit_edge(&ounce, &kilogram, Map::linear(0.028349523125)).unwrap();
    graph.add_unit_edge(&slug, &kilogram, Map::linear(14.59390294)).unwrap();

    // --- Time ---
    let second = unit("second", &["s"], dims.time.clone());
    let minute = unit("minute", &["min"], dims.time.clone());
    let hour = unit("hour", &["h"], dims.time.clone());
    let day = unit("day", &["d"], dims.time.clone());
    let year = unit("year", &["yr"], dims.time.clone());
    graph.add_unit_edge(&minute, &second, Map::linear(60.0)).unwrap();
    graph.add_unit_edge(&hour, &second, Map::linear(3600.0)).unwrap();
    graph.add_unit_edge(&day, &second, Map::linear(86400.0)).unwrap();
    graph.add_unit_edge(&year, &second, Map::linear(31_557_600.0)).unwrap();

    // --- Temperature ---
    let kelvin = unit("kelvin", &["K"], dims.temperature.clone());
    let celsius = unit("celsius", &["\u{b0}C"], dims.temperature.clone());
    let fahrenheit = unit("fahrenheit", &["\u{b0}F"], dims.temperature.clone());
    graph.add_unit_edge(&celsius, &kelvin, Map::affine(1.0, 273.15)).unwrap();
    graph
        .add_unit_edge(&fahrenheit, &kelvin, Map::affine(5.0 / 9.0, 255.372_222_222_222_2))
        .unwrap();

    // --- Pressure ---
    let pascal = unit("pascal", &["Pa"], dims.pressure.clone());
    let atmosphere = unit("atmosphere", &["atm"], dims.pressure.clone());
    let bar = unit("bar", &["bar"], dims.pressure.clone());
    let psi = unit("psi", &["psi"], dims.pressure.clone());
    let mmhg = unit("millimeter_mercury", &["mmHg"], dims.pressure.clone());
    graph.add_unit_edge(&atmosphere, &pascal, Map::linear(101_325.0)).unwrap();
    graph.add_unit_edge(&bar, &pascal, Map::linear(100_000.0)).unwrap();
    graph.add_unit_edge(&psi, &pascal, Map::linear(6894.757_293_168)).unwrap();
    graph.add_unit_edge(&mmhg, &pascal, Map::linear(133.322_387_415)).unwrap();

    // --- Force ---
    let newton = unit("newton", &["N"], dims.force.clone());
    let pound_force = unit("pound_force", &["lbf"], dims.force.clone());
    let dyne = unit("dyne", &["dyn"], dims.force.clone());
    graph.add_unit_edge(&pound_force, &newton, Map::linear(4.448_221_615_260_5)).unwrap();
    graph.add_unit_edge(&dyne, &newton, Map::linear(1e-5)).unwrap();

    // --- Viscosity ---
    let pascal_second = unit("pascal_second", &["Pa\u{b7}s"], dims.dynamic_viscosity.clone());
    let poise = unit("poise", &["P"], dims.dynamic_viscosity.clone());
    graph.add_unit_edge(&poise, &pascal_second, Map::linear(0.1)).unwrap();

    // --- Volume (cross-structure shortcut: liter -> meter^3) ---
    let liter = unit("liter", &["L"], dims.volume.clone());
    let gallon = unit("gallon", &["gal"], dims.volume.clone());
    let meter_cubed = product(&meter, 3);
    graph
        .add_product_edge(&product(&liter, 1), &meter_cubed, Map::linear(0.001))
        .unwrap();
    graph.add_unit_edge(&gallon, &liter, Map::linear(3.785_411_784)).unwrap();

    // --- Energy ---
    let joule = unit("joule", &["J"], dims.energy.clone());
    let calorie = unit("calorie", &["cal"], dims.energy.clone());
    let btu = unit("btu", &["BTU"], dims.energy.clone());
    let electronvolt = unit("electronvolt", &["eV"], dims.energy.clone());
    let kilowatt_hour = unit("kilowatt_hour", &["kWh"], dims.energy.clone());
    graph.add_unit_edge(&calorie, &joule, Map::linear(4.184)).unwrap();
    graph.add_unit_edge(&btu, &joule, Map::linear(1055.055_852_62)).unwrap();
    graph
        .add_unit_edge(&electronvolt, &joule, Map::linear(1.602_176_634e-19))
        .unwrap();
    graph.add_unit_edge(&kilowatt_hour, &joule, Map::linear(3.6e6)).unwrap();

    // --- Power (cross-structure shortcut: BTU/hour -> watt; W<->dBm LogMap) ---
    let watt = unit("watt", &["W"], dims.power.clone());
    let horsepower = unit("horsepower", &["hp"], dims.power.clone());
    let btu_per_hour = product(&btu, 1).div(&product(&hour, 1));
    graph
        .add_product_edge(&btu_per_hour, &product(&watt, 1), Map::linear(0.293_071_07))
        .unwrap();
    graph.add_unit_edge(&horsepower, &watt, Map::linear(745.699_871_582_270_22)).unwrap();
    let dbm = unit("dBm", &["dBm"], dims.power.clone());
    graph.add_unit_edge(&watt, &dbm, Map::log(10.0, 10.0, 30.0, 1.0)).unwrap();

    // --- Information ---
    let bit = unit("bit", &["b"], dims.information.clone());
    let byte = unit("byte", &["B"], dims.information.clone());
    graph.add_unit_edge(&byte, &bit, Map::linear(8.0)).unwrap();

    // --- Angle (pseudo) ---
    let radian = unit("radian", &["rad"], dims.angle.clone());
    let degree = unit("degree", &["deg"], dims.angle.clone());
    let gradian = unit("gradian", &["grad"], dims.angle.clone());
    graph.add_unit_edge(&degree, &radian, Map::linear(PI / 180.0)).unwrap();
    graph.add_unit_edge(&gradian, &radian, Map::linear(PI / 200.0)).unwrap();

    // --- Solid angle (pseudo) ---
    let steradian = unit("steradian", &["sr"], dims.solid_angle.clone());
    let square_degree = unit("square_degree", &["deg^2"], dims.solid_angle.clone());
    graph
        .add_unit_edge(&square_degree, &steradian, Map::linear((PI / 180.0).powi(2)))
        .unwrap();

    // --- Ratio/logarithmic (pseudo) ---
    let dimensionless = unit("dimensionless", &["1"], dims.ratio.clone());
    let percent = unit("percent", &["%"], dims.ratio.clone());
    let permille = unit("permille", &["\u{2030}"], dims.ratio.clone());
    let ppm = unit("ppm", &["ppm"], dims.ratio.clone());
    let ppb = unit("ppb", &["ppb"], dims.ratio.clone());
    graph.add_unit_edge(&percent, &dimensionless, Map::linear(0.01)).unwrap();
    graph.add_unit_edge(&permille, &dimensionless, Map::linear(0.001)).unwrap();
    graph.add_unit_edge(&ppm, &dimensionless, Map::linear(1e-6)).unwrap();
    graph.add_unit_edge(&ppb, &dimensionless, Map::linear(1e-9)).unwrap();

    // pH, defined against a mol/L concentration reference (§4.9).
    let mol_per_liter = unit("mol_per_liter", &["mol/L"], dims.concentration.clone());
    let ph = unit("pH", &["pH"], dims.concentration.clone());
    graph.add_unit_edge(&mol_per_liter, &ph, Map::log(-1.0, 10.0, 0.0, 1.0)).unwrap();

    // --- Count (pseudo) ---
    let each = unit("each", &["ea"], dims.count.clone());
    let dozen = unit("dozen", &["dz"], dims.count.clone());
    graph.add_unit_edge(&dozen, &each, Map::linear(12.0)).unwrap();

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn si_to_cgs_is_a_clean_projection() {
        let t = si_to_cgs_transform();
        assert!(t.embedding().is_ok());
    }

    #[test]
    fn si_to_cgs_esu_current_row_is_not_clean() {
        let t = si_to_cgs_esu_transform();
        assert!(t.embedding().is_err());
        assert!(si_to_cgs_esu_constant_aware().inverse().is_ok());
    }

    #[test]
    fn basis_graph_connects_si_and_cgs() {
        let graph = basis_graph();
        assert!(graph.has_path(&si_basis(), &cgs_basis()));
    }

    #[test]
    fn conversion_graph_converts_feet_to_meters() {
        let graph = conversion_graph();
        let dims = dimensions();
        let foot = unit("foot", &["ft"], dims.length.clone());
        let meter = unit("meter", &["m"], dims.length.clone());
        let map = graph
            .convert(&product(&foot, 1), &product(&meter, 1))
            .unwrap();
        assert!((map.apply(1.0).unwrap() - 0.3048).abs() < 1e-9);
    }

    #[test]
    fn conversion_graph_converts_watts_to_dbm() {
        let graph = conversion_graph();
        let dims = dimensions();
        let watt = unit("watt", &["W"], dims.power.clone());
        let dbm = unit("dBm", &["dBm"], dims.power.clone());
        let map = graph.convert(&product(&watt, 1), &product(&dbm, 1)).unwrap();
        assert!((map.apply(1.0).unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn conversion_graph_converts_liters_to_cubic_meters() {
        let graph = conversion_graph();
        let dims = dimensions();
        let liter = unit("liter", &["L"], dims.volume.clone());
        let meter = unit("meter", &["m"], dims.length.clone());
        let map = graph
            .convert(&product(&liter, 1), &product(&meter, 3))
            .unwrap();
        assert!((map.apply(1.0).unwrap() - 0.001).abs() < 1e-12);
    }

    #[test]
    fn conversion_graph_chains_btu_per_hour_to_watt() {
        let graph = conversion_graph();
        let dims = dimensions();
        let btu = unit("btu", &["BTU"], dims.energy.clone());
        let hour = unit("hour", &["h"], dims.time.clone());
        let watt = unit("watt", &["W"], dims.power.clone());
        let btu_per_hour = product(&btu, 1).div(&product(&hour, 1));
        let map = graph.convert(&btu_per_hour, &product(&watt, 1)).unwrap();
        assert!((map.apply(1.0).unwrap() - 0.293_071_07).abs() < 1e-6);
    }

    #[test]
    fn conversion_graph_converts_mph_to_kph_factorwise() {
        let graph = conversion_graph();
        let dims = dimensions();
        let mile = unit("mile", &["mi"], dims.length.clone());
        let meter = unit("meter", &["m"], dims.length.clone());
        let hour = unit("hour", &["h"], dims.time.clone());
        let mph = product(&mile, 1).div(&product(&hour, 1));
        let mps = product(&meter, 1).div(&product(&hour, 1));
        let map = graph.convert(&mph, &mps).unwrap();
        assert!((map.apply(1.0).unwrap() - 1609.344).abs() < 1e-6);
    }
}
