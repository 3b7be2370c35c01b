use anyhow::Result;
use genealogy::{calc_age, parse_wire};

use crate::output::{AgeReport, Output};

pub fn run(birth: &str, death: &str, out: &Output) -> Result<()> {
    let birth = parse_wire(birth);
    let death = parse_wire(death);
    let age = calc_age(birth.as_ref(), death.as_ref());
    out.print(&AgeReport::new(birth, death, age))
}
