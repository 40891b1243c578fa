/*!

This is the long-form manual for `event_impact` and `eventimpact`.

## Input datasets

Four datasets are needed, either as Excel workbooks (`.xlsx`) or as comma
separated values (`.csv`). The first row of each dataset holds the column names.

### Survey

One row per respondent. Two columns are required:

* the residency question. `Sí`, `Si` and `No` (in any case, with any spacing)
  are recognized. Respondents with any other answer are ignored.
* the travel motive. Blank answers are counted as `no response`.

The spending columns are found by approximate matching of the header against
the reference questions (see [`crate::Expense::canonical_label`]). A column is
accepted if its similarity is at least 0.7. The matches and their scores are
part of the output, and any of them can be given explicitly in the
configuration.

|  Reside  |  Motivo                          | ¿Cuántos días estará ...? | ... |
|----------|----------------------------------|---------------------------|-----|
|  No      | Venir a los eventos religiosos   | 3                         |     |
|  Sí      |                                  |                           |     |

### Capacity

One row per event or venue with its potential capacity (default column name
`Potential capacity`). Missing or non-numeric capacities count as zero,
negative capacities are rejected. The rows can be restricted to one event with
the event column.

### Direct effects (EED)

One row per economic sector: a sector identifier (code or name) and the direct
economic effect.

### Multipliers

One row per sector: the same kind of identifier as the direct effects and the
intraregional multiplier. A sector may appear only once.

## Computation

**Population of non-local visitors.** With `V` valid respondents, `N` of
them non-local, `P` of those with the primary motive:

```text
proportion = N / V
weighting  = w_primary * P / N + w_others * (N - P) / N
PNL        = capacity * proportion * weighting
```

When the non-local respondents give more than two different motives and the
correction is enabled, the primary weight becomes `w_primary - (N - P) / N`.

**Central statistics.** For every spending variable of the non-local
respondents, the mean is used if a Shapiro-Wilk test does not reject normality
(p-value above 0.05), and the median otherwise. Both choices can be forced.
Variables with fewer than 3 answers are undefined.

**Indirect and induced effects.** For lodging, food and transport:

```text
indirect = PNL * daily spending * days of stay
induced  = indirect * multiplier - indirect
```

Undefined values are replaced by zero by default. They can also exclude the
category from the breakdown.

**Sectors.** The direct effects are joined with the multipliers on the sector
identifier. The indirect and induced totals are spread over the joined sectors
in proportion to their direct effect, or evenly when the direct effects are
zero or negative. Each sector also gets its share of every column total in
percent.

*/
