//! CID3 statement emitter
//!
//! Renders placed operations as CIX text for Biesse routers: an `ID` block,
//! the `MAINDATA` panel block, then one `GEOTEXT`/`ROUTG`/`ENDPATH`
//! engraving sequence per label and one `BG` boring macro per drill, in
//! slot order.

use crate::error::EmissionError;
use crate::layout::{LayoutBounds, Operation, Placement};
use cixkit_core::{format_mm, Diameter, GenerationConfig, PanelSize, SpindleId};
use std::fmt::Display;

/// First id used for engraving geometry and routing macros
pub const FIRST_ENGRAVING_ID: u32 = 1001;

const CID3_RELEASE: &str = "5.0";

const MAINDATA_FIXED: &[(&str, &str)] = &[
    ("ORLST", "\"1\""),
    ("SIMMETRY", "1"),
    ("TLCHK", "0"),
    ("TOOLING", "\"\""),
    ("CUSTSTR", "$B$KBsExportToNcRoverNET.XncExtraPanelData$V\"\""),
    ("FCN", "1.000000"),
    ("XCUT", "0"),
    ("YCUT", "0"),
    ("JIGTH", "0"),
    ("CKOP", "0"),
    ("UNIQUE", "0"),
    ("MATERIAL", "\"wood\""),
    ("PUTLST", "\"\""),
    ("OPPWKRS", "0"),
    ("UNICLAMP", "0"),
    ("CHKCOLL", "0"),
    ("WTPIANI", "0"),
    ("COLLTOOL", "0"),
    ("CALCEDTH", "0"),
    ("ENABLELABEL", "0"),
    ("LOCKWASTE", "0"),
    ("LOADEDGEOPT", "0"),
    ("ITLTYPE", "0"),
    ("RUNPAV", "0"),
    ("FLIPEND", "0"),
];

const GEOTEXT_PLACEMENT: &[(&str, &str)] = &[
    ("SIDE", "0"),
    ("CRN", "\"2\""),
    ("RTY", "2"),
    ("NRP", "0"),
    ("DX", "0"),
    ("DY", "0"),
];

const GEOTEXT_STYLE: &[(&str, &str)] = &[
    ("Z", "0"),
    ("ALN", "1"),
    ("ANG", "0"),
    ("VRS", "0"),
    ("ACC", "0.1"),
    ("CIR", "0"),
    ("RDS", "0"),
    ("PST", "0"),
    ("FNT", "\"Arial\""),
    ("SZE", "8"),
    ("BOL", "0"),
    ("ITL", "0"),
    ("UDL", "0"),
    ("STR", "0"),
    ("WGH", "1"),
    ("CHS", "0"),
];

const ROUTG_MACHINING: &[(&str, &str)] = &[
    ("DIA", "0"),
    ("THR", "0"),
    ("RV", "0"),
    ("CRC", "0"),
    ("CKA", "3"),
    ("AZ", "0"),
    ("AR", "0"),
    ("OPT", "1"),
    ("RSP", "0"),
    ("IOS", "0"),
    ("WSP", "0"),
    ("DSP", "0"),
    ("IMS", "0"),
    ("VTR", "1"),
    ("DVR", "0"),
    ("INCSTP", "0"),
    ("OTR", "1"),
    ("SVR", "0"),
    ("COF", "0"),
    ("DOF", "0"),
    ("TIN", "0"),
    ("CIN", "1"),
    ("AIN", "90"),
    ("GIN", "0"),
    ("TLI", "0"),
    ("TQI", "0"),
    ("TBI", "0"),
    ("DIN", "0"),
    ("TOU", "0"),
    ("COU", "1"),
    ("AOU", "90"),
    ("GOU", "0"),
    ("TBO", "0"),
    ("TLO", "0"),
    ("TQO", "0"),
    ("DOU", "0"),
    ("PRP", "100"),
    ("SDS", "0"),
    ("SDSF", "2000"),
    ("UDT", "0"),
    ("TDT", "\"\""),
    ("DDT", "5"),
    ("SDT", "0"),
    ("IDT", "20"),
    ("FDT", "80"),
    ("RDT", "60"),
    ("CRR", "0"),
    ("GIP", "1"),
    ("OVM", "0"),
    ("SWI", "0"),
    ("BLW", "0"),
    ("TOS", "1"),
];

const ROUTG_TRAILER: &[(&str, &str)] = &[
    ("TTP", "0"),
    ("SPI", "\"\""),
    ("BFC", "0"),
    ("SHT", "0"),
    ("SHP", "0"),
    ("SHD", "0"),
    ("PRS", "0"),
    ("NEBS", "0"),
    ("ETB", "0"),
    ("FXD", "0"),
    ("FXDA", "0"),
    ("KDT", "0"),
    ("EML", "0"),
    ("CKT", "0"),
    ("ETG", "0"),
    ("ETGT", "0.1"),
    ("AJT", "0"),
    ("ION", "0"),
    ("LUBMNZ", "0"),
    ("LPR", "1"),
    ("LNG", "0"),
    ("ZS", "0"),
    ("ZE", "0"),
    ("RDIN", "0"),
    ("COPRES", "0"),
    ("CRT", "0"),
];

const BG_ENTRY: &[(&str, &str)] = &[("Z", "0"), ("AP", "0"), ("MD", "0")];

const BG_CYCLE: &[(&str, &str)] = &[
    ("THR", "0"),
    ("CKA", "3"),
    ("AZ", "0"),
    ("AR", "0"),
    ("RTY", "5"),
];

const BG_FEEDS: &[(&str, &str)] = &[
    ("IOS", "0"),
    ("WSP", "0"),
    ("DDS", "0"),
    ("DSP", "0"),
    ("RMD", "1"),
    ("DQT", "0"),
    ("ERDW", "0"),
    ("DFW", "0"),
    ("TOS", "1"),
    ("VTR", "0"),
    ("TTP", "0"),
];

const BG_TRAILER: &[(&str, &str)] = &[
    ("BFC", "0"),
    ("PRS", "0"),
    ("SHT", "0"),
    ("SHP", "0"),
    ("SHD", "0"),
    ("COPRES", "0"),
    ("AJT", "0"),
    ("ION", "0"),
];

/// A `BEGIN MACRO` block under construction
struct MacroBlock {
    name: &'static str,
    params: Vec<(&'static str, String)>,
}

impl MacroBlock {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            params: Vec::new(),
        }
    }

    fn param(mut self, key: &'static str, value: impl Display) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    fn quoted(self, key: &'static str, value: impl Display) -> Self {
        self.param(key, format!("\"{}\"", value))
    }

    fn fixed(mut self, table: &[(&'static str, &'static str)]) -> Self {
        self.params
            .extend(table.iter().map(|&(key, value)| (key, value.to_string())));
        self
    }

    fn render(self, lines: &mut Vec<String>) {
        lines.push("BEGIN MACRO".to_string());
        lines.push(format!("\tNAME={}", self.name));
        lines.extend(
            self.params
                .into_iter()
                .map(|(key, value)| format!("\tPARAM,NAME={},VALUE={}", key, value)),
        );
        lines.push("END MACRO".to_string());
        lines.push(String::new());
    }
}

/// One-decimal millimetre rendering for coordinates, sizes and diameters
fn mm(value: f64) -> String {
    format!("{:.1}", value)
}

/// Panel width and height (LPX, LPY) for the placed operations
pub fn panel_dimensions(placements: &[Placement], config: &GenerationConfig) -> (f64, f64) {
    match config.panel_size {
        PanelSize::Auto { margin } => {
            let bounds = LayoutBounds::from_slots(placements);
            (bounds.width() + 2.0 * margin, bounds.height() + 2.0 * margin)
        }
        PanelSize::Manual { width, height } => (width, height),
    }
}

/// Render placed operations as CIX lines
///
/// The result ends with an empty line, so joining it with `\n` yields text
/// with a trailing newline.
pub fn emit(
    placements: &[Placement],
    config: &GenerationConfig,
) -> Result<Vec<String>, EmissionError> {
    check_contract(placements)?;

    let (width, height) = panel_dimensions(placements, config);
    let mut lines = vec![
        "BEGIN ID CID3".to_string(),
        format!("\tREL= {}", CID3_RELEASE),
        "END ID".to_string(),
        " ".to_string(),
        "BEGIN MAINDATA".to_string(),
        format!("\tLPX={}", mm(width)),
        format!("\tLPY={}", mm(height)),
        format!("\tLPZ={}", mm(config.panel_thickness)),
    ];
    lines.extend(
        MAINDATA_FIXED
            .iter()
            .map(|(key, value)| format!("\t{}={}", key, value)),
    );
    lines.push("END MAINDATA".to_string());
    lines.push(String::new());

    let mut engraving_id = FIRST_ENGRAVING_ID;
    for Placement { operation, slot } in placements {
        match operation {
            Operation::Label { text, .. } => {
                engraving_block(&mut lines, engraving_id, text, slot.x, slot.y, config);
                engraving_id += 1;
            }
            Operation::Drill { diameter, spindle } => {
                drill_block(&mut lines, *spindle, *diameter, slot.x, slot.y, config);
            }
        }
    }

    Ok(lines)
}

fn check_contract(placements: &[Placement]) -> Result<(), EmissionError> {
    let mut current_label: Option<Diameter> = None;

    for Placement { operation, slot } in placements {
        if !slot.x.is_finite() || !slot.y.is_finite() {
            return Err(EmissionError::NonFiniteCoordinate {
                operation: operation.to_string(),
            });
        }
        if slot.x < 0.0 || slot.y < 0.0 {
            return Err(EmissionError::NegativeCoordinate {
                operation: operation.to_string(),
                x: slot.x,
                y: slot.y,
            });
        }

        match operation {
            Operation::Label { diameter, .. } => current_label = Some(*diameter),
            Operation::Drill { diameter, spindle } => {
                if current_label != Some(*diameter) {
                    return Err(EmissionError::OrphanDrill {
                        spindle: spindle.get(),
                        diameter: diameter.to_string(),
                    });
                }
            }
        }
    }

    Ok(())
}

fn engraving_block(
    lines: &mut Vec<String>,
    id: u32,
    text: &str,
    x: f64,
    y: f64,
    config: &GenerationConfig,
) {
    let geometry_id = format!("G{}.{}", id, id);

    MacroBlock::new("GEOTEXT")
        .quoted("LAY", "Layer 0")
        .quoted("ID", &geometry_id)
        .fixed(GEOTEXT_PLACEMENT)
        .quoted("TXT", text)
        .param("X", mm(x))
        .param("Y", mm(y))
        .fixed(GEOTEXT_STYLE)
        .render(lines);

    MacroBlock::new("ROUTG")
        .quoted("LAY", "Layer 0")
        .quoted("ID", format!("RG{}.{}", id, id))
        .quoted("GID", &geometry_id)
        .quoted("SIL", "")
        .param("Z", 0)
        .param("DP", format_mm(config.engraving_depth))
        .fixed(ROUTG_MACHINING)
        .quoted("TNM", config.engraving_tool.to_uppercase())
        .fixed(ROUTG_TRAILER)
        .render(lines);

    MacroBlock::new("ENDPATH").render(lines);
}

fn drill_block(
    lines: &mut Vec<String>,
    spindle: SpindleId,
    diameter: Diameter,
    x: f64,
    y: f64,
    config: &GenerationConfig,
) {
    MacroBlock::new("BG")
        .quoted("LAY", "BG")
        .quoted("ID", format!("T{}", spindle))
        .param("SIDE", 0)
        .quoted("CRN", 2)
        .param("X", mm(x))
        .param("Y", mm(y))
        .fixed(BG_ENTRY)
        .param("DP", format_mm(config.effective_drill_depth(diameter)))
        .quoted("TNM", "")
        .param("DIA", mm(diameter.mm()))
        .fixed(BG_CYCLE)
        .param("RSP", config.drill_speed)
        .fixed(BG_FEEDS)
        .quoted("SPI", format!("t{}", spindle))
        .fixed(BG_TRAILER)
        .render(lines);
}
